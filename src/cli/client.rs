use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::cli::config::CliSession;

/// Error returned by the server, with its status and JSON body
#[derive(Debug, thiserror::Error)]
#[error("{message} (HTTP {status})")]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub body: Value,
}

/// Thin JSON client for the REST API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_session(session: &CliSession) -> anyhow::Result<Self> {
        Self::new(&session.server_url, session.token.clone())
    }

    /// Client for commands that need a login
    pub fn authenticated(session: &CliSession) -> anyhow::Result<Self> {
        if session.token.is_none() {
            return Err(anyhow!("Not logged in. Run `craft auth login <email> --password ...` first"));
        }
        Self::from_session(session)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> anyhow::Result<Value> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.base_url))?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed"))
            .to_string();
        Err(ApiFailure { status, message, body }.into())
    }
}

/// Status of a failed call, if it was rejected by the server
pub fn failure_status(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<ApiFailure>().map(|failure| failure.status)
}
