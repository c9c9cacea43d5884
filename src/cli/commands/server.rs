use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a server (logs out of the previous one)")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the selected server")]
    Current,

    #[command(about = "Show server information from the API root endpoint")]
    Info,

    #[command(about = "Check server health from the /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            session.server_url = parsed.as_str().trim_end_matches('/').to_string();
            session.logout();
            save_session(&session)?;
            output_success(
                output_format,
                &format!("Using server {}", session.server_url),
                Some(json!({ "server_url": session.server_url })),
            )
        }
        ServerCommands::Current => output_success(
            output_format,
            &format!("Current server: {}", session.server_url),
            Some(json!({ "server_url": session.server_url, "logged_in_as": session.email })),
        ),
        ServerCommands::Info => {
            let body = ApiClient::from_session(&session)?.get("/", &[]).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    println!(
                        "{} v{} at {}",
                        body["name"].as_str().unwrap_or("unknown"),
                        body["version"].as_str().unwrap_or("?"),
                        session.server_url
                    );
                    if let Some(description) = body["description"].as_str() {
                        println!("{}", description);
                    }
                }
            }
            Ok(())
        }
        ServerCommands::Health => {
            let body = ApiClient::from_session(&session)?.get("/health", &[]).await?;
            output_success(
                output_format,
                &format!("{} is healthy (store: {})", session.server_url, body["store"].as_str().unwrap_or("?")),
                Some(body),
            )
        }
    }
}
