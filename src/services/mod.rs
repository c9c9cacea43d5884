pub mod account_service;
pub mod resource_service;

pub use account_service::{AccountService, LoginInput, RegisterInput, Session};
pub use resource_service::ResourceService;

use thiserror::Error;

use crate::auth::JwtError;
use crate::database::models::FieldErrors;
use crate::database::DatabaseError;
use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Stored document could not be read: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ServiceError::PasswordHash(err.to_string())
    }
}
