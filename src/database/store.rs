use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::Filter;

/// A stored document: the system columns every collection shares plus the
/// JSON body handed back to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: Value,
}

/// Document store backing every collection. Each call is a single
/// operation against a single collection; there are no cross-document
/// transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// All documents matching `filter`, in the filter's order.
    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError>;

    async fn insert(&self, collection: &str, document: Document) -> Result<(), DatabaseError>;

    /// Replace the first document matching `filter`. Returns false when
    /// nothing matched.
    async fn replace_one(&self, filter: &Filter, document: Document) -> Result<bool, DatabaseError>;

    /// Remove the first document matching `filter`, returning its body.
    async fn delete_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError>;

    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> Result<(), DatabaseError>;
}
