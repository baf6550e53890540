//! libSQL-backed document store

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use crate::error::{Error, Result};
use crate::models::RecordId;

use super::{
    ChangeNotice, CollectionQuery, Database, Document, DocumentStore, QueryOrder, Snapshot,
    Subscription,
};

/// Capacity of the change-notice fanout channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Document store persisted in libSQL (local file, in-memory, or Turso
/// embedded replica).
///
/// Every mutation fans a change notice out to subscription tasks, each of
/// which re-queries its collection and pushes a fresh wholesale snapshot.
#[derive(Clone)]
pub struct LibSqlStore {
    db: Arc<Mutex<Database>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl LibSqlStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            db: Arc::new(Mutex::new(db)),
            changes,
        }
    }

    /// Open an in-memory store (primarily for tests)
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// Sync the underlying replica with its remote, when configured
    pub async fn sync(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.sync().await
    }

    /// Returns whether remote sync is configured
    pub async fn is_sync_enabled(&self) -> bool {
        let db = self.db.lock().await;
        db.is_sync_enabled()
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn notify(&self, collection: &str, owner_id: &str) {
        // No receivers is fine; subscriptions come and go.
        let _ = self.changes.send(ChangeNotice {
            collection: collection.to_string(),
            owner_id: owner_id.to_string(),
        });
    }

    fn parse_document(row: &libsql::Row) -> Result<Document> {
        let id: String = row.get(0)?;
        let id = id
            .parse::<RecordId>()
            .map_err(|_| Error::InvalidInput(format!("invalid document id: {id}")))?;
        let fields: String = row.get(4)?;
        Ok(Document {
            id,
            owner_id: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
            fields: serde_json::from_str(&fields)?,
        })
    }

    async fn run_query(db: &Arc<Mutex<Database>>, query: &CollectionQuery) -> Result<Vec<Document>> {
        let sql = match query.order {
            QueryOrder::CreatedDescending => {
                "SELECT id, owner_id, created_at, updated_at, fields
                 FROM documents
                 WHERE collection = ? AND owner_id = ?
                 ORDER BY created_at DESC"
            }
            QueryOrder::Unordered => {
                "SELECT id, owner_id, created_at, updated_at, fields
                 FROM documents
                 WHERE collection = ? AND owner_id = ?"
            }
        };

        let db = db.lock().await;
        let mut rows = db
            .connection()
            .query(
                sql,
                libsql::params![query.collection.clone(), query.owner_id.clone()],
            )
            .await?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(Self::parse_document(&row)?);
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for LibSqlStore {
    async fn subscribe(&self, query: CollectionQuery) -> Result<Subscription> {
        let (tx, subscription) = Subscription::channel();
        let db = Arc::clone(&self.db);
        let mut notices = self.changes.subscribe();

        tokio::spawn(async move {
            let initial = match Self::run_query(&db, &query).await {
                Ok(documents) => Snapshot { documents },
                Err(error) => {
                    tracing::warn!("Initial snapshot query failed: {error}");
                    return;
                }
            };
            if tx.send(initial).await.is_err() {
                return;
            }

            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    notice = notices.recv() => {
                        match notice {
                            Ok(notice) if !notice.matches(&query) => continue,
                            // A lagged receiver just refreshes; snapshots are
                            // wholesale, so skipped notices lose nothing.
                            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                            Err(broadcast::error::RecvError::Closed) => break,
                        }

                        match Self::run_query(&db, &query).await {
                            Ok(documents) => {
                                if tx.send(Snapshot { documents }).await.is_err() {
                                    break;
                                }
                            }
                            Err(error) => {
                                tracing::warn!("Snapshot refresh failed: {error}");
                                break;
                            }
                        }
                    }
                }
            }
        });

        Ok(subscription)
    }

    async fn fetch(&self, query: &CollectionQuery) -> Result<Vec<Document>> {
        Self::run_query(&self.db, query).await
    }

    async fn get(
        &self,
        collection: &str,
        owner_id: &str,
        id: RecordId,
    ) -> Result<Option<Document>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT id, owner_id, created_at, updated_at, fields
                 FROM documents
                 WHERE collection = ? AND id = ? AND owner_id = ?",
                libsql::params![collection, id.as_str(), owner_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_document(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, collection: &str, owner_id: &str, fields: Value) -> Result<Document> {
        let now = Self::now_ms();
        let document = Document {
            id: RecordId::new(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
            fields,
        };

        {
            let db = self.db.lock().await;
            db.connection()
                .execute(
                    "INSERT INTO documents (collection, id, owner_id, created_at, updated_at, fields)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    libsql::params![
                        collection,
                        document.id.as_str(),
                        document.owner_id.clone(),
                        document.created_at,
                        document.updated_at,
                        serde_json::to_string(&document.fields)?
                    ],
                )
                .await?;
        }

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
        let now = Self::now_ms();

        let rows = {
            let db = self.db.lock().await;
            db.connection()
                .execute(
                    "UPDATE documents SET fields = ?, updated_at = ?
                     WHERE collection = ? AND id = ? AND owner_id = ?",
                    libsql::params![
                        serde_json::to_string(&fields)?,
                        now,
                        collection,
                        id.as_str(),
                        owner_id
                    ],
                )
                .await?
        };

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.notify(collection, owner_id);
        self.get(collection, owner_id, id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn delete(&self, collection: &str, owner_id: &str, id: RecordId) -> Result<()> {
        let rows = {
            let db = self.db.lock().await;
            db.connection()
                .execute(
                    "DELETE FROM documents WHERE collection = ? AND id = ? AND owner_id = ?",
                    libsql::params![collection, id.as_str(), owner_id],
                )
                .await?
        };

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        self.notify(collection, owner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    async fn setup() -> LibSqlStore {
        LibSqlStore::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_insert_and_fetch_ordered() {
        let store = setup().await;

        let first = store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store
            .insert("applications", "u1", json!({"company": "Globex"}))
            .await
            .unwrap();

        let docs = store
            .fetch(&CollectionQuery::new("applications", "u1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second.id);
        assert_eq!(docs[1].id, first.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_queries_are_owner_scoped() {
        let store = setup().await;

        store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();
        store
            .insert("applications", "u2", json!({"company": "Globex"}))
            .await
            .unwrap();

        let docs = store
            .fetch(&CollectionQuery::new("applications", "u1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].owner_id, "u1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_bumps_updated_at_and_checks_ownership() {
        let store = setup().await;
        let doc = store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = store
            .update("applications", "u1", doc.id, json!({"company": "Acme Corp"}))
            .await
            .unwrap();
        assert!(updated.updated_at > doc.updated_at);
        assert_eq!(updated.created_at, doc.created_at);

        // Another owner cannot touch the document.
        let err = store
            .update("applications", "u2", doc.id, json!({"company": "X"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_twice_reports_not_found() {
        let store = setup().await;
        let doc = store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();

        store.delete("applications", "u1", doc.id).await.unwrap();
        let err = store
            .delete("applications", "u1", doc.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subscription_pushes_snapshots_on_change() {
        let store = setup().await;
        let mut subscription = store
            .subscribe(CollectionQuery::new("applications", "u1"))
            .await
            .unwrap();

        let initial = subscription.next().await.unwrap();
        assert!(initial.documents.is_empty());

        store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();

        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot.documents.len(), 1);
        assert_eq!(snapshot.documents[0].fields["company"], "Acme");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subscription_ignores_other_owners() {
        let store = setup().await;
        let mut subscription = store
            .subscribe(CollectionQuery::new("applications", "u1"))
            .await
            .unwrap();
        subscription.next().await.unwrap();

        store
            .insert("applications", "u2", json!({"company": "Globex"}))
            .await
            .unwrap();
        store
            .insert("applications", "u1", json!({"company": "Acme"}))
            .await
            .unwrap();

        // Only the u1 change produces a snapshot, and it never contains u2 data.
        let snapshot = subscription.next().await.unwrap();
        assert_eq!(snapshot.documents.len(), 1);
        assert_eq!(snapshot.documents[0].owner_id, "u1");
    }
}
