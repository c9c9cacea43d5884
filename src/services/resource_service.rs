use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{FieldErrors, Resource};
use crate::database::Store;
use crate::filter::Filter;

/// Ownership-scoped CRUD over one entity type.
///
/// Every operation takes the caller's id and filters on it. Records owned by
/// someone else behave exactly like records that do not exist.
pub struct ResourceService<E: Resource> {
    store: Arc<dyn Store>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Resource> ResourceService<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Owner's records matching `query`, newest first. No match is an empty list.
    pub async fn list(&self, owner_id: Uuid, query: &E::Query) -> Result<Vec<E>, ServiceError> {
        let filter = E::list_filter(owner_id, query)?;
        let documents = self.store.find(&filter).await?;
        debug!("Listed {} {} for owner {}", documents.len(), E::COLLECTION, owner_id);

        documents
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(ServiceError::from))
            .collect()
    }

    pub async fn create(&self, owner_id: Uuid, input: E::Input) -> Result<E, ServiceError> {
        let mut entity = E::new(Uuid::new_v4(), owner_id, Utc::now());
        let mut errors = FieldErrors::new();
        entity.apply(input, &mut errors);
        entity.validate(&mut errors);
        errors.into_result()?;

        self.store.insert(E::COLLECTION, entity.to_document()?).await?;
        info!("Created {} {} for owner {}", E::SINGULAR, entity.id(), owner_id);
        Ok(entity)
    }

    pub async fn read(&self, owner_id: Uuid, id: Uuid) -> Result<E, ServiceError> {
        let filter = Filter::owned_record(E::COLLECTION, owner_id, id)?;
        match self.store.find_one(&filter).await? {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => {
                debug!("{} {} not visible to owner {}", E::LABEL, id, owner_id);
                Err(ServiceError::NotFound(E::LABEL))
            }
        }
    }

    /// Merge `input` over the stored record and re-validate the result
    pub async fn update(&self, owner_id: Uuid, id: Uuid, input: E::Input) -> Result<E, ServiceError> {
        let mut entity = self.read(owner_id, id).await?;

        let mut errors = FieldErrors::new();
        entity.apply(input, &mut errors);
        entity.validate(&mut errors);
        errors.into_result()?;
        entity.set_updated_at(Utc::now());

        let filter = Filter::owned_record(E::COLLECTION, owner_id, id)?;
        // Deleted between the read and the write
        if !self.store.replace_one(&filter, entity.to_document()?).await? {
            return Err(ServiceError::NotFound(E::LABEL));
        }
        info!("Updated {} {} for owner {}", E::SINGULAR, id, owner_id);
        Ok(entity)
    }

    /// Permanently remove the record, returning what was deleted
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<E, ServiceError> {
        let filter = Filter::owned_record(E::COLLECTION, owner_id, id)?;
        match self.store.delete_one(&filter).await? {
            Some(body) => {
                info!("Deleted {} {} for owner {}", E::SINGULAR, id, owner_id);
                Ok(serde_json::from_value(body)?)
            }
            None => Err(ServiceError::NotFound(E::LABEL)),
        }
    }
}
