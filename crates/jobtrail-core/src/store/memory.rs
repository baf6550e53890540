//! In-memory document store
//!
//! Reference [`DocumentStore`] used by binding tests and demos. Failure modes
//! of a managed remote can be scripted: ordered-query support can be turned
//! off to exercise the missing-index fallback, and writes can be forced to
//! fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::models::RecordId;

use super::{
    ChangeNotice, CollectionQuery, Document, DocumentStore, QueryOrder, Snapshot, Subscription,
};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct MemoryInner {
    /// (collection, document), in insertion order
    documents: Vec<(String, Document)>,
    /// Logical clock: write timestamps are strictly monotonic
    clock: i64,
}

impl MemoryInner {
    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.clock = now.max(self.clock + 1);
        self.clock
    }

    fn snapshot(&self, query: &CollectionQuery) -> Snapshot {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|(collection, doc)| {
                collection == &query.collection && doc.owner_id == query.owner_id
            })
            .map(|(_, doc)| doc.clone())
            .collect();

        if query.order == QueryOrder::CreatedDescending {
            // Stable: insertion order preserved on equal timestamps.
            documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Snapshot { documents }
    }
}

/// Scriptable in-process document store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
    changes: broadcast::Sender<ChangeNotice>,
    ordered_queries: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(MemoryInner::default())),
            changes,
            ordered_queries: Arc::new(AtomicBool::new(true)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Toggle server-side ordered query support. When off, ordered
    /// subscriptions fail with [`Error::MissingIndex`], the way a store
    /// without the composite `(owner_id, created_at)` index behaves.
    #[must_use]
    pub fn with_ordered_queries(self, supported: bool) -> Self {
        self.ordered_queries.store(supported, Ordering::SeqCst);
        self
    }

    /// Force all subsequent writes to fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a document verbatim, keeping its id and timestamps.
    ///
    /// Intended for seeding scenarios with known clock values.
    pub fn seed(&self, collection: &str, document: Document) {
        let owner_id = document.owner_id.clone();
        {
            let mut inner = self.inner.lock().expect("memory store lock poisoned");
            inner.clock = inner.clock.max(document.created_at);
            inner.documents.push((collection.to_string(), document));
        }
        self.notify(collection, &owner_id);
    }

    fn notify(&self, collection: &str, owner_id: &str) {
        let _ = self.changes.send(ChangeNotice {
            collection: collection.to_string(),
            owner_id: owner_id.to_string(),
        });
    }

    fn check_writes_enabled(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Write("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, query: CollectionQuery) -> Result<Subscription> {
        if query.order == QueryOrder::CreatedDescending
            && !self.ordered_queries.load(Ordering::SeqCst)
        {
            return Err(Error::MissingIndex(format!(
                "no composite index for ordered query on {}",
                query.collection
            )));
        }

        let (tx, subscription) = Subscription::channel();
        let inner = Arc::clone(&self.inner);
        let mut notices = self.changes.subscribe();

        tokio::spawn(async move {
            let initial = inner
                .lock()
                .expect("memory store lock poisoned")
                .snapshot(&query);
            if tx.send(initial).await.is_err() {
                return;
            }

            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    notice = notices.recv() => {
                        match notice {
                            Ok(notice) if !notice.matches(&query) => continue,
                            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                            Err(broadcast::error::RecvError::Closed) => break,
                        }

                        let snapshot = inner
                            .lock()
                            .expect("memory store lock poisoned")
                            .snapshot(&query);
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(subscription)
    }

    async fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Document>> {
        let inner = self.inner.lock().expect("memory store lock poisoned");
        Ok(inner.snapshot(query).documents)
    }

    async fn get(
        &self,
        collection: &str,
        owner_id: &str,
        id: RecordId,
    ) -> Result<Option<Document>> {
        let inner = self.inner.lock().expect("memory store lock poisoned");
        Ok(inner
            .documents
            .iter()
            .find(|(c, doc)| c == collection && doc.id == id && doc.owner_id == owner_id)
            .map(|(_, doc)| doc.clone()))
    }

    async fn insert(&self, collection: &str, owner_id: &str, fields: Value) -> Result<Document> {
        self.check_writes_enabled()?;

        let document = {
            let mut inner = self.inner.lock().expect("memory store lock poisoned");
            let now = inner.next_timestamp();
            let document = Document {
                id: RecordId::new(),
                owner_id: owner_id.to_string(),
                created_at: now,
                updated_at: now,
                fields,
            };
            inner
                .documents
                .push((collection.to_string(), document.clone()));
            document
        };

        self.notify(collection, owner_id);
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        owner_id: &str,
        id: RecordId,
        fields: Value,
    ) -> Result<Document> {
        self.check_writes_enabled()?;

        let updated = {
            let mut inner = self.inner.lock().expect("memory store lock poisoned");
            let now = inner.next_timestamp();
            let entry = inner
                .documents
                .iter_mut()
                .find(|(c, doc)| c == collection && doc.id == id && doc.owner_id == owner_id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            entry.1.fields = fields;
            entry.1.updated_at = now;
            entry.1.clone()
        };

        self.notify(collection, owner_id);
        Ok(updated)
    }

    async fn delete(&self, collection: &str, owner_id: &str, id: RecordId) -> Result<()> {
        self.check_writes_enabled()?;

        {
            let mut inner = self.inner.lock().expect("memory store lock poisoned");
            let before = inner.documents.len();
            inner
                .documents
                .retain(|(c, doc)| !(c == collection && doc.id == id && doc.owner_id == owner_id));
            if inner.documents.len() == before {
                return Err(Error::NotFound(id.to_string()));
            }
        }

        self.notify(collection, owner_id);
        Ok(())
    }
}
