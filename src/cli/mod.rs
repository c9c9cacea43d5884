pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "craft")]
#[command(about = "Craft Tracker CLI - manage projects and supplies from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Choose and check the API server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Register, log in and out")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Project and supply totals with the five most recent projects")]
    Dashboard,

    #[command(about = "Manage craft projects")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },

    #[command(about = "Manage the supply inventory")]
    Supply {
        #[command(subcommand)]
        cmd: commands::supply::SupplyCommands,
    },

    #[command(about = "Load the demo account with sample projects and supplies")]
    Seed {
        #[arg(long, help = "Delete the demo account's existing projects and supplies first")]
        reset: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&output_format).await,
        Commands::Project { cmd } => commands::project::handle(cmd, &output_format).await,
        Commands::Supply { cmd } => commands::supply::handle(cmd, &output_format).await,
        Commands::Seed { reset } => commands::seed::handle(reset, &output_format).await,
    };

    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        let code = client::failure_status(e).map(|status| status.as_str().to_string());
        utils::output_error(&output_format, &e.to_string(), code.as_deref())?;
    }
    result
}
