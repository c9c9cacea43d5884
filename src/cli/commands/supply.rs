use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::{merge_fields, output_record, output_records, output_success, read_json_stdin, str_field};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SupplyCommands {
    #[command(about = "List supplies, newest first")]
    List {
        #[arg(long, help = "yarn, fabric, thread, needles, tools, patterns, other or all")]
        category: Option<String>,
        #[arg(long, help = "Case-insensitive match on name, color or notes")]
        search: Option<String>,
    },

    #[command(about = "Show one supply")]
    Show {
        #[arg(help = "Supply id")]
        id: String,
    },

    #[command(about = "Add a supply from flags, or from JSON on stdin with --stdin")]
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, help = "Read the supply body as JSON from stdin")]
        stdin: bool,
    },

    #[command(about = "Update a supply from flags and/or JSON on stdin")]
    Update {
        #[arg(help = "Supply id")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, help = "Read fields to change as JSON from stdin")]
        stdin: bool,
    },

    #[command(about = "Delete a supply permanently")]
    Delete {
        #[arg(help = "Supply id")]
        id: String,
    },
}

pub async fn handle(cmd: SupplyCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = ApiClient::authenticated(&session)?;

    match cmd {
        SupplyCommands::List { category, search } => {
            let mut query = Vec::new();
            if let Some(category) = category {
                query.push(("category", category));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            let body = client.get("/supplies", &query).await?;
            output_records(output_format, &body, "supplies", "No supplies found", supply_line)
        }
        SupplyCommands::Show { id } => {
            let body = client.get(&format!("/supplies/{}", id), &[]).await?;
            output_record(output_format, &body, "supply")
        }
        SupplyCommands::Create { name, category, quantity, unit, color, notes, stdin } => {
            let base = if stdin { read_json_stdin()? } else { json!({}) };
            let body = merge_fields(
                base,
                vec![
                    ("name", name.map(Value::from)),
                    ("category", category.map(Value::from)),
                    ("quantity", quantity.map(Value::from)),
                    ("unit", unit.map(Value::from)),
                    ("color", color.map(Value::from)),
                    ("notes", notes.map(Value::from)),
                ],
            );
            let created = client.post("/supplies", &body).await?;
            output_success(
                output_format,
                &format!("Added supply {} ({})", str_field(&created["supply"], "name"), str_field(&created["supply"], "id")),
                Some(created.clone()),
            )
        }
        SupplyCommands::Update { id, name, quantity, unit, stdin } => {
            let base = if stdin { read_json_stdin()? } else { json!({}) };
            let body = merge_fields(
                base,
                vec![
                    ("name", name.map(Value::from)),
                    ("quantity", quantity.map(Value::from)),
                    ("unit", unit.map(Value::from)),
                ],
            );
            let updated = client.put(&format!("/supplies/{}", id), &body).await?;
            output_success(
                output_format,
                &format!("Updated supply {}", str_field(&updated["supply"], "name")),
                Some(updated.clone()),
            )
        }
        SupplyCommands::Delete { id } => {
            let body = client.delete(&format!("/supplies/{}", id)).await?;
            output_success(output_format, str_field(&body, "message"), Some(json!({ "id": id })))
        }
    }
}

fn supply_line(supply: &Value) -> String {
    let color = str_field(supply, "color");
    format!(
        "{}  {:<9} {} {}  {}{}",
        str_field(supply, "id"),
        str_field(supply, "category"),
        supply["quantity"],
        str_field(supply, "unit"),
        str_field(supply, "name"),
        if color.is_empty() { String::new() } else { format!(" ({})", color) }
    )
}
