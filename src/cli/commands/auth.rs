use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session, CliSession};
use crate::cli::utils::{output_success, str_field};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Forget the stored session token")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        AuthCommands::Register { name, email, password } => {
            let body = ApiClient::from_session(&session)?
                .post("/auth/register", &json!({ "name": name, "email": email, "password": password }))
                .await?;
            output_success(
                output_format,
                &format!("Registered {}. Log in with `craft auth login {}`", str_field(&body["user"], "email"), email),
                Some(body),
            )
        }
        AuthCommands::Login { email, password } => {
            let body = login(&mut session, &email, &password).await?;
            save_session(&session)?;
            output_success(
                output_format,
                &format!("Logged in as {}", str_field(&body["user"], "email")),
                Some(json!({ "user": body["user"], "expiresIn": body["expiresIn"] })),
            )
        }
        AuthCommands::Whoami => {
            let body = ApiClient::authenticated(&session)?.get("/auth/me", &[]).await?;
            let user = &body["user"];
            output_success(
                output_format,
                &format!("{} <{}>", str_field(user, "name"), str_field(user, "email")),
                Some(body.clone()),
            )
        }
        AuthCommands::Logout => {
            session.logout();
            save_session(&session)?;
            output_success(output_format, "Logged out", None)
        }
    }
}

/// Log in and record the token on `session`; returns the login response
pub async fn login(session: &mut CliSession, email: &str, password: &str) -> anyhow::Result<Value> {
    let body = ApiClient::from_session(session)?
        .post("/auth/login", &json!({ "email": email, "password": password }))
        .await?;
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Login response did not include a token"))?
        .to_string();
    session.login(token, str_field(&body["user"], "email").to_string());
    Ok(body)
}
