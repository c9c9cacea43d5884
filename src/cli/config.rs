use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const SESSION_FILE: &str = "session.json";

/// Persisted CLI state: which server to talk to and the current login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliSession {
    pub server_url: String,
    pub token: Option<String>,
    pub email: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl Default for CliSession {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            email: None,
            logged_in_at: None,
        }
    }
}

impl CliSession {
    pub fn login(&mut self, token: String, email: String) {
        self.token = Some(token);
        self.email = Some(email);
        self.logged_in_at = Some(Utc::now());
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.email = None;
        self.logged_in_at = None;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CRAFT_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("craft-tracker").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<CliSession> {
    load_session_from(&get_config_dir()?)
}

pub fn save_session(session: &CliSession) -> anyhow::Result<()> {
    save_session_to(&get_config_dir()?, session)
}

pub fn load_session_from(dir: &std::path::Path) -> anyhow::Result<CliSession> {
    let session_file = dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(CliSession::default());
    }

    let content = fs::read_to_string(session_file)?;
    let session: CliSession = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session_to(dir: &std::path::Path, session: &CliSession) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_session() {
        let dir = std::env::temp_dir().join(format!("craft-cli-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        let session = load_session_from(&dir).unwrap();
        assert_eq!(session, CliSession::default());

        let mut session = session;
        session.login("tok".into(), "demo@example.com".into());
        save_session_to(&dir, &session).unwrap();
        assert_eq!(load_session_from(&dir).unwrap().token.as_deref(), Some("tok"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
