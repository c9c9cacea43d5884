// handlers/protected/resource.rs - owner-scoped CRUD routes
//
// One set of handlers serves every Resource; the router instantiates them
// per entity (`list::<Project>`, `read::<Supply>`, ...).

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::Resource;
use crate::error::ApiError;
use crate::middleware::{keyed, message, ApiResponse, ApiResult, AuthUser, JsonBody, QueryParams};
use crate::state::AppState;

/// GET /{collection} - `{ "<collection>": [...] }`, newest first
pub async fn list<E: Resource>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    QueryParams(query): QueryParams<E::Query>,
) -> ApiResult<Value> {
    let records = state.resources::<E>().list(user.user_id, &query).await?;
    Ok(ApiResponse::success(keyed(E::COLLECTION, records)?))
}

/// POST /{collection} - 201 `{ "<singular>": {...} }`
pub async fn create<E: Resource>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<E::Input>,
) -> ApiResult<Value> {
    let record = state.resources::<E>().create(user.user_id, input).await?;
    Ok(ApiResponse::created(keyed(E::SINGULAR, record)?))
}

pub async fn read<E: Resource>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id::<E>(&id)?;
    let record = state.resources::<E>().read(user.user_id, id).await?;
    Ok(ApiResponse::success(keyed(E::SINGULAR, record)?))
}

pub async fn update<E: Resource>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<E::Input>,
) -> ApiResult<Value> {
    let id = parse_id::<E>(&id)?;
    let record = state.resources::<E>().update(user.user_id, id, input).await?;
    Ok(ApiResponse::success(keyed(E::SINGULAR, record)?))
}

pub async fn delete<E: Resource>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id::<E>(&id)?;
    state.resources::<E>().delete(user.user_id, id).await?;
    Ok(ApiResponse::success(message(format!("{} deleted successfully", E::LABEL))))
}

// A malformed id cannot name any record, so it is reported like a missing one
fn parse_id<E: Resource>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", E::LABEL)))
}
