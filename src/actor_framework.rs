use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::error::GatewayError;
use crate::gateway::{Gateway, OrderBy, Row, Table};

// =============================================================================
// 1. THE ABSTRACTION (Records, Patches, Hooks)
// =============================================================================

/// A row type that a [`ResourceActor`] keeps a canonical in-memory list of.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Patch: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Backing table.
    const TABLE: Table;

    fn id(&self) -> &str;

    /// Apply a patch to the in-memory copy.
    fn on_update(&mut self, patch: &Self::Patch);

    /// Decode a wire row.
    fn from_row(row: Row) -> Result<Self, String> {
        serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| e.to_string())
    }

    /// Encode for insert. An empty `id` is left for the store to assign.
    fn to_row(&self) -> Result<Row, String> {
        let mut row = to_object(self)?;
        if self.id().is_empty() {
            row.remove("id");
        }
        Ok(row)
    }

    /// Encode a patch for the `update` call.
    fn patch_row(patch: &Self::Patch) -> Result<Row, String> {
        to_object(patch)
    }
}

fn to_object<S: Serialize>(value: &S) -> Result<Row, String> {
    match serde_json::to_value(value).map_err(|e| e.to_string())? {
        serde_json::Value::Object(row) => Ok(row),
        other => Err(format!("expected an object, got {other}")),
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the request")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] GatewayError),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result of a full refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list now mirrors the store (`n` records).
    Loaded(usize),
    /// The store was empty or unreachable and the fallback list was published.
    Fallback(usize),
}

/// Shared, immutable view of a store's list.
pub type Snapshot<T> = Arc<Vec<T>>;

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Record> {
    Fetch {
        respond_to: Response<FetchOutcome>,
    },
    Create {
        record: T,
        respond_to: Response<T>,
    },
    Update {
        id: String,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns the canonical list for one table and serializes every mutation of it.
///
/// The list is published through a `watch` channel after each change, so
/// readers see an optimistic write for the whole round-trip without waiting
/// on the actor.
pub struct ResourceActor<T: Record, G: Gateway> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    gateway: Arc<G>,
    state: watch::Sender<Snapshot<T>>,
    fallback: Option<Vec<T>>,
    showing_fallback: bool,
}

impl<T: Record, G: Gateway> ResourceActor<T, G> {
    pub fn new(buffer_size: usize, gateway: Arc<G>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (state, snapshots) = watch::channel(Arc::new(Vec::new()));
        let actor = Self {
            receiver,
            gateway,
            state,
            fallback: None,
            showing_fallback: false,
        };
        let client = ResourceClient::new(sender, snapshots);
        (actor, client)
    }

    /// List to publish when a fetch comes back empty, or fails before
    /// anything was loaded.
    pub fn with_fallback(mut self, fallback: Option<Vec<T>>) -> Self {
        self.fallback = fallback;
        self
    }

    #[instrument(name = "resource_actor", skip(self), fields(table = %T::TABLE))]
    pub async fn run(mut self) {
        info!("Resource actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Fetch { respond_to } => {
                    let _ = respond_to.send(self.handle_fetch().await);
                }
                ResourceRequest::Create { record, respond_to } => {
                    let _ = respond_to.send(self.handle_create(record).await);
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch).await);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id).await);
                }
                ResourceRequest::Shutdown => {
                    info!("Resource actor shutting down");
                    break;
                }
            }
        }
        info!("Resource actor stopped");
    }

    fn current(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    fn publish(&self, records: Vec<T>) {
        self.state.send_replace(Arc::new(records));
    }

    fn publish_fallback(&mut self) -> Option<usize> {
        let fallback = self.fallback.clone()?;
        let count = fallback.len();
        self.publish(fallback);
        self.showing_fallback = true;
        Some(count)
    }

    /// Fallback records exist only in memory; writes against them never reach the store.
    fn reject_if_fallback(&self, id: &str) -> Result<(), FrameworkError> {
        if self.showing_fallback {
            debug!("Fallback list shown, record is not stored");
            return Err(FrameworkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_fetch(&mut self) -> Result<FetchOutcome, FrameworkError> {
        debug!("Processing fetch request");
        match self.gateway.select(T::TABLE, Some(OrderBy::newest_first())).await {
            Ok(rows) => {
                let records = decode_rows::<T>(rows);
                if records.is_empty() {
                    if let Some(count) = self.publish_fallback() {
                        info!(count, "Store empty, publishing fallback list");
                        return Ok(FetchOutcome::Fallback(count));
                    }
                }
                let count = records.len();
                self.publish(records);
                self.showing_fallback = false;
                info!(count, "Fetched records");
                Ok(FetchOutcome::Loaded(count))
            }
            Err(e) => {
                error!(error = %e, "Fetch failed, keeping current list");
                if !self.current().is_empty() {
                    return Err(e.into());
                }
                match self.publish_fallback() {
                    Some(count) => {
                        warn!(count, "Nothing loaded yet, publishing fallback list");
                        Ok(FetchOutcome::Fallback(count))
                    }
                    None => Err(e.into()),
                }
            }
        }
    }

    /// Acknowledged insert: memory gains the record only after the store
    /// confirms the write.
    #[instrument(fields(id = %record.id()), skip(self, record))]
    async fn handle_create(&mut self, record: T) -> Result<T, FrameworkError> {
        debug!("Processing create request");
        let row = record.to_row().map_err(FrameworkError::InvalidRecord)?;

        let stored_rows = match self.gateway.insert(T::TABLE, vec![row]).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Insert failed, list unchanged");
                return Err(e.into());
            }
        };

        let stored = match stored_rows.into_iter().next().map(T::from_row) {
            Some(Ok(stored)) => stored,
            Some(Err(e)) => {
                warn!(error = %e, "Store echoed an undecodable row, keeping submitted record");
                record
            }
            None => record,
        };

        if self.showing_fallback {
            // Fallback records are not stored; only the confirmed row is.
            self.publish(vec![stored.clone()]);
            self.showing_fallback = false;
        } else {
            self.state.send_modify(|list| {
                let list = Arc::make_mut(list);
                list.retain(|existing| existing.id() != stored.id());
                list.insert(0, stored.clone());
            });
        }
        info!(id = %stored.id(), "Record created");
        Ok(stored)
    }

    /// Optimistic update: publish the patched list, write, and restore the
    /// captured list verbatim if the write fails.
    #[instrument(skip(self, patch))]
    async fn handle_update(&mut self, id: String, patch: T::Patch) -> Result<T, FrameworkError> {
        debug!(?patch, "Processing update request");
        let patch_row = T::patch_row(&patch).map_err(FrameworkError::InvalidRecord)?;
        self.reject_if_fallback(&id)?;

        let previous = self.current();
        let mut next = previous.as_ref().clone();
        let Some(record) = next.iter_mut().find(|record| record.id() == id) else {
            debug!("Record not in list");
            return Err(FrameworkError::NotFound(id));
        };
        record.on_update(&patch);
        let updated = record.clone();
        self.publish(next);

        if let Err(e) = self.gateway.update(T::TABLE, patch_row, id).await {
            warn!(error = %e, "Update failed, rolling back");
            self.state.send_replace(previous);
            return Err(e.into());
        }

        info!("Update confirmed");
        Ok(updated)
    }

    /// Optimistic delete with the same rollback discipline as updates.
    #[instrument(skip(self))]
    async fn handle_delete(&mut self, id: String) -> Result<(), FrameworkError> {
        debug!("Processing delete request");
        self.reject_if_fallback(&id)?;
        let previous = self.current();
        if !previous.iter().any(|record| record.id() == id) {
            debug!("Record not in list");
            return Err(FrameworkError::NotFound(id));
        }
        let next: Vec<T> = previous.iter().filter(|record| record.id() != id).cloned().collect();
        self.publish(next);

        if let Err(e) = self.gateway.delete(T::TABLE, id).await {
            warn!(error = %e, "Delete failed, rolling back");
            self.state.send_replace(previous);
            return Err(e.into());
        }

        info!("Delete confirmed");
        Ok(())
    }
}

/// Decode rows, dropping (and logging) any that do not fit the schema.
fn decode_rows<T: Record>(rows: Vec<Row>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let id = crate::gateway::row_id(&row);
            match T::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(table = %T::TABLE, id = ?id, error = %e, "Skipping undecodable row");
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Record> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    snapshots: watch::Receiver<Snapshot<T>>,
}

impl<T: Record> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>, snapshots: watch::Receiver<Snapshot<T>>) -> Self {
        Self { sender, snapshots }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn fetch(&self) -> Result<FetchOutcome, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Fetch { respond_to }).await
    }

    pub async fn create(&self, record: T) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { record, respond_to }).await
    }

    pub async fn update(&self, id: String, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: String) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    /// Current list, without a round-trip to the actor.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published change.
    pub fn watch(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshots.clone()
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
