// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Craft Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Track craft projects, their tasks, and your supply stash",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/auth/register, /auth/login (public); /auth/me (session)",
            "projects": "/projects[/:id] (session; ?status=&important=true&search=)",
            "supplies": "/supplies[/:id] (session; ?category=&search=)",
        }
    }))
}

/// 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
