// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware + validate_user_middleware,
// and every record operation is scoped to the caller's user id.
pub mod auth;
pub mod resource;

pub use auth::me;
