pub mod auth;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{keyed, message, ApiResponse, ApiResult, JsonBody, QueryParams};
pub use validate_user::{validate_user_middleware, ValidatedUser};
