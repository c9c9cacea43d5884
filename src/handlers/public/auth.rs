// handlers/public/auth.rs - POST /auth/register and POST /auth/login

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::{LoginInput, RegisterInput, Session};
use crate::state::AppState;

/// POST /auth/register
///
/// Body: `{ name, email, password }`. Responds 201 with the new profile;
/// 409 when the email is taken, 400 with `field_errors` otherwise.
pub async fn register(State(state): State<AppState>, JsonBody(input): JsonBody<RegisterInput>) -> ApiResult<Value> {
    let user = state.accounts().register(input).await?;

    Ok(ApiResponse::created(json!({
        "user": user.profile(),
        "message": "Registration successful"
    })))
}

/// POST /auth/login
///
/// Body: `{ email, password }`. Unknown email and wrong password both give
/// the same 401.
pub async fn login(State(state): State<AppState>, JsonBody(input): JsonBody<LoginInput>) -> ApiResult<Session> {
    let session = state.accounts().login(input).await?;
    Ok(ApiResponse::success(session))
}
