use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, instrument, warn};

use super::{
    row_id, ChangeEvent, ChangeKind, Gateway, OrderBy, Row, Subscription, Table,
    CHANGE_FEED_CAPACITY,
};
use crate::error::GatewayError;

/// In-process row store with a broadcast change feed.
///
/// Assigns `id` (when absent) and `created_at` (when absent) on insert and
/// enforces `id` uniqueness per table, like a primary key would.
#[derive(Clone)]
pub struct MemoryGateway {
    tables: Arc<Mutex<HashMap<Table, Vec<Row>>>>,
    changes: broadcast::Sender<ChangeEvent>,
    fail_writes: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
            changes,
            fail_writes: Arc::new(AtomicBool::new(false)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Make every subsequent insert/update/delete fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of live change-feed subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Raw rows of a table in storage order.
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables.lock().await.get(&table).cloned().unwrap_or_default()
    }

    fn check_writable(&self, table: Table) -> Result<(), GatewayError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            warn!(%table, "Rejecting write (failure injected)");
            return Err(GatewayError::Rejected(format!("writes to {table} are failing")));
        }
        Ok(())
    }

    fn notify(&self, table: Table, kind: ChangeKind) {
        // No subscribers is fine.
        let _ = self.changes.send(ChangeEvent { table, kind });
    }
}

impl Gateway for MemoryGateway {
    #[instrument(skip(self))]
    async fn select(&self, table: Table, order: Option<OrderBy>) -> Result<Vec<Row>, GatewayError> {
        let mut rows = self.rows(table).await;
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(order.column), b.get(order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        debug!(row_count = rows.len(), "Selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        self.check_writable(table)?;
        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = match row_id(&row) {
                Some(id) => id,
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
                    row.insert("id".to_string(), Value::String(id.clone()));
                    id
                }
            };
            let duplicate = stored
                .iter()
                .chain(inserted.iter())
                .any(|existing| row_id(existing).as_deref() == Some(id.as_str()));
            if duplicate {
                return Err(GatewayError::Rejected(format!("duplicate id {id} in {table}")));
            }
            if !matches!(row.get("created_at"), Some(Value::String(_))) {
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
                row.insert("created_at".to_string(), Value::String(now));
            }
            inserted.push(row);
        }

        stored.extend(inserted.iter().cloned());
        drop(tables);

        self.notify(table, ChangeKind::Insert);
        Ok(inserted)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, table: Table, patch: Row, id: String) -> Result<(), GatewayError> {
        self.check_writable(table)?;
        let mut tables = self.tables.lock().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row).as_deref() == Some(id.as_str())))
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;

        for (column, value) in patch {
            if column != "id" {
                row.insert(column, value);
            }
        }
        drop(tables);

        self.notify(table, ChangeKind::Update);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: Table, id: String) -> Result<(), GatewayError> {
        self.check_writable(table)?;
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| row_id(row).as_deref() != Some(id.as_str()));
        if rows.len() == before {
            return Err(GatewayError::NotFound(id));
        }
        drop(tables);

        self.notify(table, ChangeKind::Delete);
        Ok(())
    }

    fn subscribe(&self, tables: &[Table]) -> Subscription {
        Subscription::new(self.changes.subscribe(), tables.to_vec())
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(_), None) => CmpOrdering::Greater,
        (None, Some(_)) => CmpOrdering::Less,
        _ => CmpOrdering::Equal,
    }
}
