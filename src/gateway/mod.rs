//! Persistence gateway: the row store the stores read from and write to.
//!
//! Rows cross this boundary as JSON objects. Decoding into domain types
//! happens in [`Record::from_row`](crate::actor_framework::Record::from_row),
//! so inconsistent wire shapes never reach the aggregation code.

pub mod memory;
pub mod rest;

pub use memory::MemoryGateway;
pub use rest::PostgrestGateway;

use std::fmt::{self, Display};
use std::future::Future;

use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::error::GatewayError;

/// A single table row as it travels over the wire.
pub type Row = serde_json::Map<String, Value>;

/// Capacity of change-feed broadcast channels.
pub const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Orders,
    Products,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Orders => "orders",
            Table::Products => "products",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order requested from `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub const fn newest_first() -> Self {
        Self {
            column: "created_at",
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Emitted in place of notifications a slow subscriber missed.
    Resync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

/// The four row operations plus the change feed the stores depend on.
pub trait Gateway: Send + Sync + 'static {
    fn select(
        &self,
        table: Table,
        order: Option<OrderBy>,
    ) -> impl Future<Output = Result<Vec<Row>, GatewayError>> + Send;

    /// Insert rows and return them as stored (with `id` / `created_at` filled in).
    fn insert(
        &self,
        table: Table,
        rows: Vec<Row>,
    ) -> impl Future<Output = Result<Vec<Row>, GatewayError>> + Send;

    fn update(
        &self,
        table: Table,
        patch: Row,
        id: String,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn delete(
        &self,
        table: Table,
        id: String,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Subscribe to change notifications for `tables`. Dropping the returned
    /// [`Subscription`] unsubscribes.
    fn subscribe(&self, tables: &[Table]) -> Subscription;
}

/// A live change-feed subscription scoped to a set of tables.
#[derive(Debug)]
pub struct Subscription {
    events: broadcast::Receiver<ChangeEvent>,
    tables: Vec<Table>,
}

impl Subscription {
    pub fn new(events: broadcast::Receiver<ChangeEvent>, tables: Vec<Table>) -> Self {
        Self { events, tables }
    }

    /// Wait for the next event on one of the watched tables.
    ///
    /// Returns `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) if self.tables.contains(&event.table) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Change feed lagged, requesting resync");
                    return Some(self.resync_event());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Discard notifications that are already queued and return how many
    /// were dropped. A full resync covers all of them.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => drained += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return drained,
            }
        }
    }

    fn resync_event(&self) -> ChangeEvent {
        ChangeEvent {
            table: self.tables.first().copied().unwrap_or(Table::Orders),
            kind: ChangeKind::Resync,
        }
    }
}

/// Reads the `id` column of a row, normalizing integer ids to strings.
pub fn row_id(row: &Row) -> Option<String> {
    match row.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_row_id_normalizes_numbers() {
        assert_eq!(row_id(&row(json!({"id": 42}))), Some("42".to_string()));
        assert_eq!(row_id(&row(json!({"id": "TH001"}))), Some("TH001".to_string()));
        assert_eq!(row_id(&row(json!({"id": null}))), None);
        assert_eq!(row_id(&row(json!({}))), None);
    }

    #[tokio::test]
    async fn test_subscription_filters_tables() {
        let (sender, receiver) = broadcast::channel(8);
        let mut subscription = Subscription::new(receiver, vec![Table::Products]);

        sender.send(ChangeEvent { table: Table::Orders, kind: ChangeKind::Insert }).unwrap();
        sender.send(ChangeEvent { table: Table::Products, kind: ChangeKind::Delete }).unwrap();

        let event = subscription.next().await.unwrap();
        assert_eq!(event.table, Table::Products);
        assert_eq!(event.kind, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn test_subscription_reports_lag_as_resync() {
        let (sender, receiver) = broadcast::channel(2);
        let mut subscription = Subscription::new(receiver, vec![Table::Orders]);

        for _ in 0..5 {
            sender.send(ChangeEvent { table: Table::Orders, kind: ChangeKind::Update }).unwrap();
        }

        let event = subscription.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Resync);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_feed_closes() {
        let (sender, receiver) = broadcast::channel(2);
        let mut subscription = Subscription::new(receiver, vec![Table::Orders]);
        drop(sender);
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drain_pending_counts_queued_events() {
        let (sender, receiver) = broadcast::channel(8);
        let mut subscription = Subscription::new(receiver, vec![Table::Orders]);
        for _ in 0..3 {
            sender.send(ChangeEvent { table: Table::Orders, kind: ChangeKind::Insert }).unwrap();
        }
        assert_eq!(subscription.drain_pending(), 3);
        assert_eq!(subscription.drain_pending(), 0);
    }
}
