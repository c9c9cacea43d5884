use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::ServiceError;
use crate::state::AppState;

/// Account loaded for the current token
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Ensures the account behind a valid token still exists. Runs after
/// `jwt_auth_middleware`.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let user = match state.accounts().profile(auth_user.user_id).await {
        Ok(user) => user,
        Err(ServiceError::NotFound(_)) => {
            tracing::warn!("User validation failed: user {} no longer exists", auth_user.user_id);
            return Err(ApiError::unauthorized("Unauthorized"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!("User validation successful: {} ({})", user.name, user.id);
    request.extensions_mut().insert(ValidatedUser(user));

    Ok(next.run(request).await)
}
