#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use craft_tracker::config::AppConfig;
use craft_tracker::database::MemoryStore;
use craft_tracker::state::AppState;

/// Full application over a fresh in-memory store
pub fn build_test_app() -> Router {
    let mut config = AppConfig::in_memory();
    config.api.enable_request_logging = false;
    let store = Arc::new(MemoryStore::with_default_indexes());
    craft_tracker::app(AppState::new(store, config))
}

/// Send one request through the router and decode the JSON reply
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, token, None).await
}

/// Register a user and return a session token for it
pub async fn login_as(app: &Router, name: &str, email: &str) -> String {
    let (status, _) = post_json(
        app,
        "/auth/register",
        None,
        json!({ "name": name, "email": email, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration of {} failed", email);

    let (status, body) = post_json(app, "/auth/login", None, json!({ "email": email, "password": "password123" })).await;
    assert_eq!(status, StatusCode::OK, "login of {} failed: {}", email, body);
    body["token"].as_str().unwrap().to_string()
}

pub async fn create_project(app: &Router, token: &str, body: Value) -> Value {
    let (status, reply) = post_json(app, "/projects", Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", reply);
    reply["project"].clone()
}

pub async fn create_supply(app: &Router, token: &str, body: Value) -> Value {
    let (status, reply) = post_json(app, "/supplies", Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", reply);
    reply["supply"].clone()
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| items.iter().filter_map(|i| i["name"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}
