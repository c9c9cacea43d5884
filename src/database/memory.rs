use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{Document, Store};
use crate::filter::filter_order::FilterOrder;
use crate::filter::Filter;

/// Process-local document store. Evaluates the same filters as the
/// Postgres backend, against documents held in memory.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    // (collection, field) pairs whose string values must be unique, compared case-insensitively
    unique: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            unique: Vec::new(),
        }
    }

    /// Store with the same unique indexes as the Postgres migrations
    pub fn with_default_indexes() -> Self {
        Self::new().with_unique("users", "email")
    }

    pub fn with_unique(mut self, collection: &str, field: &str) -> Self {
        self.unique.push((collection.to_string(), field.to_string()));
        self
    }

    fn check_unique(&self, collection: &str, existing: &[Document], candidate: &Document) -> Result<(), DatabaseError> {
        for (unique_collection, field) in &self.unique {
            if unique_collection != collection {
                continue;
            }
            let Some(value) = candidate.body.get(field).and_then(Value::as_str) else {
                continue;
            };
            let clash = existing.iter().any(|doc| {
                doc.id != candidate.id
                    && doc
                        .body
                        .get(field)
                        .and_then(Value::as_str)
                        .map(|other| other.to_lowercase() == value.to_lowercase())
                        .unwrap_or(false)
            });
            if clash {
                return Err(DatabaseError::Duplicate(format!("{}_{}_unique", collection, field)));
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(filter.table_name()) else {
            return Ok(vec![]);
        };

        // Walk newest insertion first so equal sort keys keep newest-first order
        let mut matched: Vec<&Document> = documents.iter().rev().filter(|doc| filter.matches(doc)).collect();
        matched.sort_by(|a, b| FilterOrder::compare(filter.order_info(), a, b));

        let limit = filter.limit_value().map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched.into_iter().take(limit).map(|doc| doc.body.clone()).collect())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError> {
        let filter = filter.clone().limit(1)?;
        Ok(self.find(&filter).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), DatabaseError> {
        // Same identifier rules as the SQL backend
        Filter::new(collection)?;

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, documents, &document)?;
        documents.push(document);
        Ok(())
    }

    async fn replace_one(&self, filter: &Filter, document: Document) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(filter.table_name()) else {
            return Ok(false);
        };
        let Some(position) = documents.iter().position(|doc| filter.matches(doc)) else {
            return Ok(false);
        };
        self.check_unique(filter.table_name(), documents, &document)?;

        let slot = &mut documents[position];
        slot.updated_at = document.updated_at;
        slot.body = document.body;
        Ok(true)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(filter.table_name()) else {
            return Ok(None);
        };
        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(position) => Ok(Some(documents.remove(position).body)),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn doc(owner: Option<Uuid>, body: Value, age_secs: i64) -> Document {
        let at = Utc::now() - Duration::seconds(age_secs);
        Document { id: Uuid::new_v4(), owner_id: owner, created_at: at, updated_at: at, body }
    }

    #[tokio::test]
    async fn find_orders_and_scopes_by_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert("projects", doc(Some(alice), json!({"name": "old"}), 60)).await.unwrap();
        store.insert("projects", doc(Some(alice), json!({"name": "new"}), 1)).await.unwrap();
        store.insert("projects", doc(Some(bob), json!({"name": "bob's"}), 1)).await.unwrap();

        let filter = Filter::new("projects").unwrap().owner(alice).order("createdAt desc").unwrap();
        let found = store.find(&filter).await.unwrap();
        let names: Vec<&str> = found.iter().filter_map(|d| d["name"].as_str()).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn equal_timestamps_list_newest_insertion_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let at = Utc::now();
        for name in ["first", "second", "third"] {
            let document = Document { id: Uuid::new_v4(), owner_id: Some(owner), created_at: at, updated_at: at, body: json!({"name": name}) };
            store.insert("supplies", document).await.unwrap();
        }

        let filter = Filter::new("supplies").unwrap().owner(owner).order("createdAt desc").unwrap();
        let found = store.find(&filter).await.unwrap();
        let names: Vec<&str> = found.iter().filter_map(|d| d["name"].as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty_not_an_error() {
        let store = MemoryStore::new();
        let filter = Filter::new("supplies").unwrap();
        assert!(store.find(&filter).await.unwrap().is_empty());
        assert!(store.delete_one(&filter).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_and_delete_respect_filter() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let original = doc(Some(owner), json!({"name": "Blanket"}), 0);
        let id = original.id;
        store.insert("projects", original.clone()).await.unwrap();

        let stranger = Filter::owned_record("projects", Uuid::new_v4(), id).unwrap();
        let replaced = store
            .replace_one(&stranger, Document { body: json!({"name": "Hijacked"}), ..original.clone() })
            .await
            .unwrap();
        assert!(!replaced);
        assert!(store.delete_one(&stranger).await.unwrap().is_none());

        let scoped = Filter::owned_record("projects", owner, id).unwrap();
        assert!(store
            .replace_one(&scoped, Document { body: json!({"name": "Quilt"}), ..original })
            .await
            .unwrap());
        assert_eq!(store.find_one(&scoped).await.unwrap().unwrap()["name"], "Quilt");
        assert_eq!(store.delete_one(&scoped).await.unwrap().unwrap()["name"], "Quilt");
        assert!(store.delete_one(&scoped).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn enforces_case_insensitive_unique_fields() {
        let store = MemoryStore::with_default_indexes();
        store.insert("users", doc(None, json!({"email": "demo@example.com"}), 0)).await.unwrap();
        let err = store
            .insert("users", doc(None, json!({"email": "Demo@Example.com"}), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)));
    }
}
