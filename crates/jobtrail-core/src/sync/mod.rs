//! Per-collection real-time synchronization with client ordering fallback.
//!
//! A [`CollectionBinding`] owns at most one live store subscription per
//! `(collection, owner)` pair and exposes a reactive [`BindingView`] through a
//! watch channel. Snapshots replace the whole list (no incremental patching),
//! so consumers must treat every view as the authoritative state at that
//! instant and never diff against prior local state for correctness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::models::{Payload, Record, RecordId};
use crate::store::{CollectionQuery, DocumentStore, Snapshot};

/// Which path produced the current view's ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// No snapshot applied yet (or no owner)
    None,
    /// Store performed the `created_at` descending ordering
    ServerOrdered,
    /// Ordered query was unavailable; the binding sorted client-side
    ClientSorted,
}

/// Reactive state exposed to consumers
#[derive(Debug, Clone)]
pub struct BindingView<P: Payload> {
    /// Records sorted by `created_at` descending, regardless of source
    pub records: Arc<Vec<Record<P>>>,
    pub loading: bool,
    pub error: Option<String>,
    pub source: SnapshotSource,
}

impl<P: Payload> BindingView<P> {
    fn empty() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            loading: false,
            error: None,
            source: SnapshotSource::None,
        }
    }

    fn loading() -> Self {
        Self {
            loading: true,
            ..Self::empty()
        }
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::empty()
        }
    }
}

/// Live, ordered view of one user's records in one collection, with
/// write-through mutations.
///
/// Owner changes are guarded by a generation counter: each activation
/// increments it and the driver task captures its own generation, so a
/// late-arriving snapshot from a previous owner's subscription can never
/// reach the new view.
pub struct CollectionBinding<P: Payload> {
    store: Arc<dyn DocumentStore>,
    generation: Arc<AtomicU64>,
    owner: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
    view_tx: watch::Sender<BindingView<P>>,
}

impl<P: Payload> CollectionBinding<P> {
    /// Create an unactivated binding. Mutations fail until
    /// [`Self::activate`] has been called.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (view_tx, _) = watch::channel(BindingView::empty());
        Self {
            store,
            generation: Arc::new(AtomicU64::new(0)),
            owner: Mutex::new(None),
            task: Mutex::new(None),
            view_tx,
        }
    }

    /// Create a binding and activate it for the given owner
    #[must_use]
    pub fn connect(store: Arc<dyn DocumentStore>, owner_id: Option<&str>) -> Self {
        let binding = Self::new(store);
        binding.activate(owner_id);
        binding
    }

    /// Subscribe to view changes. The receiver always holds a current value.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<BindingView<P>> {
        self.view_tx.subscribe()
    }

    /// The current view
    #[must_use]
    pub fn current(&self) -> BindingView<P> {
        self.view_tx.borrow().clone()
    }

    /// (Re)activate the binding for an owner, closing any prior subscription
    /// first. An absent owner yields an empty, non-loading view with no
    /// subscription; there is no "wait for auth" limbo state.
    pub fn activate(&self, owner_id: Option<&str>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.owner.lock().expect("owner lock poisoned") = owner_id.map(ToString::to_string);
        self.stop_task();

        let Some(owner_id) = owner_id else {
            self.view_tx.send_replace(BindingView::empty());
            return;
        };

        self.view_tx.send_replace(BindingView::loading());

        let store = Arc::clone(&self.store);
        let current_generation = Arc::clone(&self.generation);
        let view_tx = self.view_tx.clone();
        let owner_id = owner_id.to_string();
        let handle = tokio::spawn(async move {
            Self::drive(store, view_tx, current_generation, generation, owner_id).await;
        });
        *self.task.lock().expect("task lock poisoned") = Some(handle);
    }

    /// Tear the binding down, closing the subscription. The last published
    /// view stays readable; pending snapshots are discarded.
    pub fn deactivate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.owner.lock().expect("owner lock poisoned") = None;
        self.stop_task();
    }

    fn stop_task(&self) {
        if let Some(handle) = self.task.lock().expect("task lock poisoned").take() {
            // Aborting drops the driver's Subscription, which is what closes
            // the store-side live query.
            handle.abort();
        }
    }

    /// Create a record. Stamps owner and timestamps at the store; no
    /// optimistic insert; the list only changes when the authoritative
    /// snapshot arrives. Never attempts anonymous writes.
    pub async fn add_item(&self, payload: P) -> Result<RecordId> {
        let owner_id = self.require_owner()?;
        payload.validate()?;
        let fields = serde_json::to_value(&payload)?;
        let document = self.store.insert(P::COLLECTION, &owner_id, fields).await?;
        Ok(document.id)
    }

    /// Replace a record's payload, bumping `updated_at`. Ownership is
    /// enforced by the store layer, not re-checked here.
    pub async fn update_item(&self, id: RecordId, payload: P) -> Result<Record<P>> {
        let owner_id = self.require_owner()?;
        payload.validate()?;
        let fields = serde_json::to_value(&payload)?;
        let document = self
            .store
            .update(P::COLLECTION, &owner_id, id, fields)
            .await?;
        document.decode()
    }

    /// Remove a record
    pub async fn delete_item(&self, id: RecordId) -> Result<()> {
        let owner_id = self.require_owner()?;
        self.store.delete(P::COLLECTION, &owner_id, id).await
    }

    fn require_owner(&self) -> Result<String> {
        if self.generation.load(Ordering::SeqCst) == 0 {
            return Err(Error::Write("binding is not activated".to_string()));
        }
        self.owner
            .lock()
            .expect("owner lock poisoned")
            .clone()
            .ok_or_else(|| Error::Write("no owner; refusing anonymous write".to_string()))
    }

    async fn drive(
        store: Arc<dyn DocumentStore>,
        view_tx: watch::Sender<BindingView<P>>,
        current_generation: Arc<AtomicU64>,
        generation: u64,
        owner_id: String,
    ) {
        let publish = |view: BindingView<P>| {
            // Discard anything from a superseded activation.
            if current_generation.load(Ordering::SeqCst) == generation {
                view_tx.send_replace(view);
            }
        };

        let query = CollectionQuery::new(P::COLLECTION, &owner_id);
        let (mut subscription, source) = match store.subscribe(query.clone()).await {
            Ok(subscription) => (subscription, SnapshotSource::ServerOrdered),
            Err(Error::MissingIndex(reason)) => {
                tracing::warn!(
                    collection = P::COLLECTION,
                    "Ordered query unavailable ({reason}); re-subscribing without order clause"
                );
                // Recover exactly once; a failure of the fallback itself is
                // terminal until the next activation.
                match store.subscribe(query.unordered()).await {
                    Ok(subscription) => (subscription, SnapshotSource::ClientSorted),
                    Err(error) => {
                        publish(BindingView::failed(error.to_string()));
                        return;
                    }
                }
            }
            Err(error) => {
                publish(BindingView::failed(error.to_string()));
                return;
            }
        };

        while let Some(snapshot) = subscription.next().await {
            let records = Self::decode_snapshot(snapshot, source);
            publish(BindingView {
                records: Arc::new(records),
                loading: false,
                error: None,
                source,
            });
        }

        // The store closed the live query underneath us.
        publish(BindingView::failed("live query closed by store".to_string()));
    }

    /// Decode a wholesale snapshot into the typed list. Undecodable
    /// documents are dropped with a warning rather than poisoning the view.
    fn decode_snapshot(snapshot: Snapshot, source: SnapshotSource) -> Vec<Record<P>> {
        let mut records: Vec<Record<P>> = snapshot
            .documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id;
                match document.decode::<P>() {
                    Ok(record) => Some(record),
                    Err(error) => {
                        tracing::warn!(
                            collection = P::COLLECTION,
                            "Dropping undecodable document {id}: {error}"
                        );
                        None
                    }
                }
            })
            .collect();

        if source == SnapshotSource::ClientSorted {
            // Stable: ties keep their snapshot order, so the result is
            // deterministic for a given snapshot.
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        records
    }
}

impl<P: Payload> Drop for CollectionBinding<P> {
    fn drop(&mut self) {
        self.stop_task();
    }
}
