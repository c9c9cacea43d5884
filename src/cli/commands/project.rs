use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::{merge_fields, output_record, output_records, output_success, read_json_stdin, str_field};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects, newest first")]
    List {
        #[arg(long, help = "planning, ongoing, completed, paused or all")]
        status: Option<String>,
        #[arg(long, help = "Only projects marked important")]
        important: bool,
        #[arg(long, help = "Case-insensitive match on name or description")]
        search: Option<String>,
    },

    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project id")]
        id: String,
    },

    #[command(about = "Create a project from flags, or from JSON on stdin with --stdin")]
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
        #[arg(long, help = "Mark as important")]
        important: bool,
        #[arg(long, help = "Read the project body as JSON from stdin")]
        stdin: bool,
    },

    #[command(about = "Update a project from flags and/or JSON on stdin")]
    Update {
        #[arg(help = "Project id")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
        #[arg(long, help = "Read fields to change as JSON from stdin")]
        stdin: bool,
    },

    #[command(about = "Delete a project permanently")]
    Delete {
        #[arg(help = "Project id")]
        id: String,
    },
}

pub async fn handle(cmd: ProjectCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = ApiClient::authenticated(&session)?;

    match cmd {
        ProjectCommands::List { status, important, search } => {
            let mut query = Vec::new();
            if let Some(status) = status {
                query.push(("status", status));
            }
            if important {
                query.push(("important", "true".to_string()));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            let body = client.get("/projects", &query).await?;
            output_records(output_format, &body, "projects", "No projects found", project_line)
        }
        ProjectCommands::Show { id } => {
            let body = client.get(&format!("/projects/{}", id), &[]).await?;
            output_record(output_format, &body, "project")
        }
        ProjectCommands::Create { name, description, status, progress, important, stdin } => {
            let base = if stdin { read_json_stdin()? } else { json!({}) };
            let body = merge_fields(
                base,
                vec![
                    ("name", name.map(Value::from)),
                    ("description", description.map(Value::from)),
                    ("status", status.map(Value::from)),
                    ("progress", progress.map(Value::from)),
                    ("isImportant", important.then_some(Value::Bool(true))),
                ],
            );
            let created = client.post("/projects", &body).await?;
            output_success(
                output_format,
                &format!("Created project {} ({})", str_field(&created["project"], "name"), str_field(&created["project"], "id")),
                Some(created.clone()),
            )
        }
        ProjectCommands::Update { id, name, status, progress, stdin } => {
            let base = if stdin { read_json_stdin()? } else { json!({}) };
            let body = merge_fields(
                base,
                vec![
                    ("name", name.map(Value::from)),
                    ("status", status.map(Value::from)),
                    ("progress", progress.map(Value::from)),
                ],
            );
            let updated = client.put(&format!("/projects/{}", id), &body).await?;
            output_success(
                output_format,
                &format!("Updated project {}", str_field(&updated["project"], "name")),
                Some(updated.clone()),
            )
        }
        ProjectCommands::Delete { id } => {
            let body = client.delete(&format!("/projects/{}", id)).await?;
            output_success(output_format, str_field(&body, "message"), Some(json!({ "id": id })))
        }
    }
}

pub(crate) fn project_line(project: &Value) -> String {
    let tasks = project["tasks"].as_array().cloned().unwrap_or_default();
    let done = tasks.iter().filter(|t| t["completed"].as_bool().unwrap_or(false)).count();
    format!(
        "{}  {:<10} {:>3}%  {}{}  [{}/{} tasks]",
        str_field(project, "id"),
        str_field(project, "status"),
        project["progress"].as_i64().unwrap_or(0),
        if project["isImportant"].as_bool().unwrap_or(false) { "★ " } else { "" },
        str_field(project, "name"),
        done,
        tasks.len()
    )
}
