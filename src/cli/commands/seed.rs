use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cli::client::{failure_status, ApiClient};
use crate::cli::commands::auth::login;
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::{output_success, str_field};
use crate::cli::OutputFormat;

const SEED_DATA: &str = include_str!("../seed_data.json");

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedData {
    pub user: SeedUser,
    pub projects: Vec<Value>,
    pub supplies: Vec<Value>,
}

pub fn seed_data() -> anyhow::Result<SeedData> {
    Ok(serde_json::from_str(SEED_DATA)?)
}

/// Register (or log into) the demo account, then load its projects and supplies
pub async fn handle(reset: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    let data = seed_data()?;
    let mut session = load_session()?;

    let registration = ApiClient::from_session(&session)?
        .post(
            "/auth/register",
            &json!({ "name": data.user.name, "email": data.user.email, "password": data.user.password }),
        )
        .await;
    match registration {
        Ok(_) => tracing::info!("Registered demo user {}", data.user.email),
        Err(e) if failure_status(&e) == Some(StatusCode::CONFLICT) => {
            tracing::info!("Demo user {} already exists, logging in", data.user.email)
        }
        Err(e) => return Err(e),
    }

    login(&mut session, &data.user.email, &data.user.password).await?;
    save_session(&session)?;
    let client = ApiClient::authenticated(&session)?;

    if reset {
        clear_collection(&client, "projects").await?;
        clear_collection(&client, "supplies").await?;
    }

    for supply in &data.supplies {
        client.post("/supplies", supply).await?;
    }
    for project in &data.projects {
        client.post("/projects", project).await?;
    }

    output_success(
        output_format,
        &format!(
            "Seeded {} projects and {} supplies for {} (password: {})",
            data.projects.len(),
            data.supplies.len(),
            data.user.email,
            data.user.password
        ),
        Some(json!({
            "email": data.user.email,
            "projects": data.projects.len(),
            "supplies": data.supplies.len()
        })),
    )
}

async fn clear_collection(client: &ApiClient, collection: &str) -> anyhow::Result<()> {
    let body = client.get(&format!("/{}", collection), &[]).await?;
    let records = body[collection].as_array().cloned().unwrap_or_default();
    for record in &records {
        client.delete(&format!("/{}/{}", collection, str_field(record, "id"))).await?;
    }
    tracing::info!("Removed {} existing {}", records.len(), collection);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{FieldErrors, Project, ProjectInput, Resource, Supply, SupplyInput};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn demo_data_passes_validation() {
        let data = seed_data().unwrap();
        assert_eq!(data.user.email, "demo@example.com");
        assert_eq!(data.projects.len(), 5);
        assert_eq!(data.supplies.len(), 10);

        for body in &data.projects {
            let input: ProjectInput = serde_json::from_value(body.clone()).unwrap();
            let mut project = Project::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
            let mut errors = FieldErrors::new();
            project.apply(input, &mut errors);
            project.validate(&mut errors);
            assert!(errors.is_empty(), "{}: {:?}", project.name, errors);
        }
        for body in &data.supplies {
            let input: SupplyInput = serde_json::from_value(body.clone()).unwrap();
            let mut supply = Supply::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
            let mut errors = FieldErrors::new();
            supply.apply(input, &mut errors);
            supply.validate(&mut errors);
            assert!(errors.is_empty(), "{}: {:?}", supply.name, errors);
        }
    }
}
