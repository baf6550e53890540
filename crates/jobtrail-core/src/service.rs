//! Shared store service
//!
//! Typed one-shot helpers over [`LibSqlStore`] for callers that do not need a
//! live subscription (the CLI's CRUD commands). The same validation applied at
//! the binding boundary applies here.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{Payload, Record, RecordId};
use crate::store::{CollectionQuery, Database, DocumentStore, LibSqlStore, SyncConfig};

/// Thread-safe handle over the document store, cheap to clone
#[derive(Clone)]
pub struct StoreService {
    store: LibSqlStore,
}

impl StoreService {
    #[must_use]
    pub const fn new(store: LibSqlStore) -> Self {
        Self { store }
    }

    /// Open a local-only store at the given path
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LibSqlStore::new(Database::open(path).await?)))
    }

    /// Open an in-memory store
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(LibSqlStore::open_in_memory().await?))
    }

    /// Open an embedded replica syncing with a managed remote
    pub async fn open_with_sync(
        path: impl AsRef<Path>,
        sync_config: SyncConfig,
    ) -> Result<Self> {
        Ok(Self::new(LibSqlStore::new(
            Database::open_with_sync(path, sync_config).await?,
        )))
    }

    /// The underlying store, for wiring up live bindings
    #[must_use]
    pub fn store(&self) -> LibSqlStore {
        self.store.clone()
    }

    /// Sync with the remote (no-op when not configured)
    pub async fn sync(&self) -> Result<()> {
        self.store.sync().await
    }

    pub async fn is_sync_enabled(&self) -> bool {
        self.store.is_sync_enabled().await
    }

    /// List an owner's records, newest first
    pub async fn list<P: Payload>(&self, owner_id: &str) -> Result<Vec<Record<P>>> {
        let documents = self
            .store
            .fetch(&CollectionQuery::new(P::COLLECTION, owner_id))
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            match document.decode::<P>() {
                Ok(record) => records.push(record),
                Err(error) => {
                    tracing::warn!(
                        "Skipping undecodable {} document: {error}",
                        P::COLLECTION
                    );
                }
            }
        }
        Ok(records)
    }

    pub async fn get<P: Payload>(&self, owner_id: &str, id: RecordId) -> Result<Record<P>> {
        self.store
            .get(P::COLLECTION, owner_id, id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?
            .decode()
    }

    /// Validate and persist a new record, returning it with its assigned id
    pub async fn create<P: Payload>(&self, owner_id: &str, payload: P) -> Result<Record<P>> {
        payload.validate()?;
        let fields = serde_json::to_value(&payload)?;
        self.store
            .insert(P::COLLECTION, owner_id, fields)
            .await?
            .decode()
    }

    /// Validate and replace a record's payload
    pub async fn update<P: Payload>(
        &self,
        owner_id: &str,
        id: RecordId,
        payload: P,
    ) -> Result<Record<P>> {
        payload.validate()?;
        let fields = serde_json::to_value(&payload)?;
        self.store
            .update(P::COLLECTION, owner_id, id, fields)
            .await?
            .decode()
    }

    pub async fn delete<P: Payload>(&self, owner_id: &str, id: RecordId) -> Result<()> {
        self.store.delete(P::COLLECTION, owner_id, id).await
    }

    /// The store as a trait object, for [`crate::sync::CollectionBinding`]
    #[must_use]
    pub fn as_document_store(&self) -> Arc<dyn DocumentStore> {
        Arc::new(self.store.clone())
    }
}
