// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) -> Protected (bearer JWT, owner-scoped)
pub mod protected;
pub mod public;

use crate::error::ApiError;

/// JSON 404 for unmatched routes
pub async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}

/// JSON 405 for a known path with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}
