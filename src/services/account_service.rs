use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::database::models::user::{self, User, UserProfile};
use crate::database::models::FieldErrors;
use crate::database::{DatabaseError, Store};
use crate::filter::Filter;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Issued on login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    /// Lifetime of the token in seconds
    pub expires_in: u64,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$").expect("email pattern is a valid regex")
    })
}

/// Registration and credential checks
pub struct AccountService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();

        let mut errors = FieldErrors::new();
        let name_len = name.chars().count();
        if name_len < NAME_MIN {
            errors.add("name", format!("Name must be at least {} characters", NAME_MIN));
        } else if name_len > NAME_MAX {
            errors.add("name", format!("Name cannot be more than {} characters", NAME_MAX));
        }
        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !email_pattern().is_match(&email) {
            errors.add("email", "Please provide a valid email");
        }
        if let Err(message) = validate_password_strength(&input.password, self.security.min_password_length) {
            errors.add("password", message);
        }
        errors.into_result()?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email is already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: hash_password(&input.password)?,
            created_at: now,
            updated_at: now,
        };

        // The unique index still catches a concurrent registration
        match self.store.insert(user::COLLECTION, user.to_document()?).await {
            Ok(()) => {}
            Err(DatabaseError::Duplicate(_)) => {
                return Err(ServiceError::Conflict("Email is already registered".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, ServiceError> {
        let email = input.email.trim().to_lowercase();

        let Some(user) = self.find_by_email(&email).await? else {
            warn!("Login failed: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };
        if !verify_password(&input.password, &user.password_hash)? {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let claims = Claims::for_user(&user, self.security.jwt_expiry_hours);
        let token = generate_jwt(&claims, &self.security.jwt_secret)?;
        info!("User {} logged in", user.id);

        Ok(Session {
            token,
            user: user.profile(),
            expires_in: self.security.jwt_expiry_hours * 3600,
        })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, ServiceError> {
        let filter = Filter::new(user::COLLECTION)?.id(user_id);
        match self.store.find_one(&filter).await? {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => Err(ServiceError::NotFound("User")),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let filter = Filter::new(user::COLLECTION)?.eq("email", email)?;
        match self.store.find_one(&filter).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }
}
