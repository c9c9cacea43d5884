use serde::Serialize;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::commands::project::project_line;
use crate::cli::config::load_session;
use crate::cli::utils::str_field;
use crate::cli::OutputFormat;

pub const RECENT_LIMIT: usize = 5;

/// Counts and recent projects shown by `craft dashboard`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub ongoing_projects: usize,
    pub completed_projects: usize,
    pub total_supplies: usize,
    pub recent_projects: Vec<Value>,
}

impl DashboardSummary {
    /// Build from the `/projects` and `/supplies` list bodies. Projects arrive
    /// newest first, so the recent ones are the head of the list.
    pub fn from_lists(projects_body: &Value, supplies_body: &Value) -> Self {
        let projects = projects_body["projects"].as_array().map(Vec::as_slice).unwrap_or_default();
        let with_status = |status: &str| projects.iter().filter(|p| p["status"] == status).count();

        Self {
            total_projects: projects.len(),
            ongoing_projects: with_status("ongoing"),
            completed_projects: with_status("completed"),
            total_supplies: supplies_body["supplies"].as_array().map(Vec::len).unwrap_or(0),
            recent_projects: projects.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }
}

pub async fn handle(output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = ApiClient::authenticated(&session)?;

    let (me, projects, supplies) = tokio::try_join!(
        client.get("/auth/me", &[]),
        client.get("/projects", &[]),
        client.get("/supplies", &[]),
    )?;
    let summary = DashboardSummary::from_lists(&projects, &supplies);

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("Welcome back, {}!", str_field(&me["user"], "name"));
            println!();
            println!("  Total projects  {}", summary.total_projects);
            println!("  Ongoing         {}", summary.ongoing_projects);
            println!("  Completed       {}", summary.completed_projects);
            println!("  Supplies        {}", summary.total_supplies);
            println!();
            if summary.recent_projects.is_empty() {
                println!("No projects yet. Create one with `craft project create --name ...`");
            } else {
                println!("Recent projects:");
                for project in &summary.recent_projects {
                    println!("  {}", project_line(project));
                }
            }
        }
    }
    Ok(())
}
