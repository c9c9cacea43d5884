use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::Store;
use crate::filter::FilterError;

/// Errors raised by the document store backends
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate value for unique field '{0}'")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Builds the configured store backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the store selected by `config`. For Postgres this creates the
    /// pool and applies pending migrations before returning.
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory document store; data is lost on restart");
                Ok(Arc::new(MemoryStore::with_default_indexes()))
            }
            StoreBackend::Postgres => {
                let url = config
                    .url
                    .as_deref()
                    .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
                let display_url = Self::redact_url(url)?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(Duration::from_secs(config.connection_timeout))
                    .connect(url)
                    .await?;
                info!("Connected to {}", display_url);

                sqlx::migrate!("./migrations").run(&pool).await?;
                info!("Database migrations applied");

                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Strip the password from a connection URL so it can be logged
    fn redact_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
