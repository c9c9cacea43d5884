// handlers/protected/auth.rs - GET /auth/me

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

pub async fn me(Extension(ValidatedUser(user)): Extension<ValidatedUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "user": user.profile() })))
}
