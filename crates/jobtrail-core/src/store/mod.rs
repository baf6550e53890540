//! Document store layer: owner-scoped collections with live subscriptions.
//!
//! The store is schemaless: each document carries an envelope (id, owner,
//! timestamps) plus an arbitrary JSON `fields` object. Typed decoding happens
//! above this layer, in the sync binding.

mod connection;
mod libsql_store;
mod memory;
mod migrations;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::models::{Payload, Record, RecordId};

pub use connection::{Database, SyncConfig};
pub use libsql_store::LibSqlStore;
pub use memory::MemoryStore;

/// Capacity of the per-subscription snapshot channel. A slow consumer only
/// ever needs the latest snapshot, so the buffer stays small.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 8;

/// One stored document: envelope plus schemaless payload fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub fields: Value,
}

impl Document {
    /// Decode into a typed record for collection payload `P`
    pub fn decode<P: Payload>(self) -> Result<Record<P>> {
        let payload = serde_json::from_value(self.fields)?;
        Ok(Record {
            id: self.id,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            payload,
        })
    }
}

/// Requested result ordering for a live query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    /// Server-side `created_at` descending; requires the composite
    /// `(owner_id, created_at)` index on the collection
    CreatedDescending,
    /// No server-side ordering; snapshot order is store-defined
    Unordered,
}

/// An owner-scoped live query against one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub collection: String,
    pub owner_id: String,
    pub order: QueryOrder,
}

impl CollectionQuery {
    #[must_use]
    pub fn new(collection: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            owner_id: owner_id.into(),
            order: QueryOrder::CreatedDescending,
        }
    }

    /// Same query without the order clause (the fallback form)
    #[must_use]
    pub fn unordered(mut self) -> Self {
        self.order = QueryOrder::Unordered;
        self
    }
}

/// A full, self-consistent view of a live query's result set, pushed by the
/// store on every change
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<Document>,
}

/// Handle to a live query. Dropping it closes the subscription; the store's
/// pusher task observes the closed channel and stops.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Snapshot>,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    pub(crate) fn channel() -> (mpsc::Sender<Snapshot>, Self) {
        let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// Wait for the next snapshot; `None` once the store side has gone away
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }
}

/// Change notice fanned out to subscription tasks after each mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChangeNotice {
    pub collection: String,
    pub owner_id: String,
}

impl ChangeNotice {
    pub(crate) fn matches(&self, query: &CollectionQuery) -> bool {
        self.collection == query.collection && self.owner_id == query.owner_id
    }
}

/// A multi-tenant document store reachable over a push-based query protocol.
///
/// Every query is owner-scoped; `update`/`delete` enforce ownership at the
/// store layer and fail with [`crate::Error::NotFound`] when the id does not
/// resolve to a document owned by the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a live query. Pushes an initial snapshot, then a fresh snapshot
    /// after every matching change. Fails with
    /// [`crate::Error::MissingIndex`] when ordering was requested but the
    /// backing index does not exist.
    async fn subscribe(&self, query: CollectionQuery) -> Result<Subscription>;

    /// One-shot query of the current result set
    async fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Document>>;

    /// Fetch a single owned document by id
    async fn get(
        &self,
        collection: &str,
        owner_id: &str,
        id: RecordId,
    ) -> Result<Option<Document>>;

    /// Create a document, stamping owner and both timestamps; returns the
    /// stored document with its newly assigned id
    async fn insert(&self, collection: &str, owner_id: &str, fields: Value) -> Result<Document>;

    /// Replace a document's payload fields and bump `updated_at`
    async fn update(
        &self,
        collection: &str,
        owner_id: &str,
        id: RecordId,
        fields: Value,
    ) -> Result<Document>;

    /// Remove a document
    async fn delete(&self, collection: &str, owner_id: &str, id: RecordId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Application;

    #[test]
    fn test_document_decode_roundtrip() {
        let app = Application {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            ..Application::default()
        };
        let doc = Document {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at: 100,
            updated_at: 100,
            fields: serde_json::to_value(&app).unwrap(),
        };

        let record = doc.clone().decode::<Application>().unwrap();
        assert_eq!(record.id, doc.id);
        assert_eq!(record.owner_id, "u1");
        assert_eq!(record.payload, app);
    }

    #[test]
    fn test_change_notice_matching() {
        let notice = ChangeNotice {
            collection: "applications".to_string(),
            owner_id: "u1".to_string(),
        };
        assert!(notice.matches(&CollectionQuery::new("applications", "u1")));
        assert!(!notice.matches(&CollectionQuery::new("applications", "u2")));
        assert!(!notice.matches(&CollectionQuery::new("contacts", "u1")));
    }
}
