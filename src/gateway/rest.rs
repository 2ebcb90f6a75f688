//! Gateway for a hosted table store speaking the PostgREST dialect
//! (`/rest/v1/<table>`, `apikey` header, `column=eq.value` filters).
//!
//! The hosted store offers no change feed over plain HTTP, so
//! [`subscribe`](Gateway::subscribe) polls the watched tables and emits an
//! `Update` event whenever a table's rows differ from the previous poll.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn, Instrument};

use super::{
    ChangeEvent, ChangeKind, Gateway, OrderBy, Row, Subscription, Table, CHANGE_FEED_CAPACITY,
};
use crate::error::GatewayError;

#[derive(Clone)]
pub struct PostgrestGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    poll_interval: Duration,
}

impl PostgrestGateway {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, poll_interval: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            poll_interval,
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.http
            .request(method, self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn poll_changes(self, tables: Vec<Table>, sender: broadcast::Sender<ChangeEvent>) {
        info!(poll_interval_ms = self.poll_interval.as_millis() as u64, "Polling change feed started");
        let mut last_seen: HashMap<Table, Vec<Row>> = HashMap::new();
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            ticker.tick().await;
            if sender.receiver_count() == 0 {
                break;
            }
            for &table in &tables {
                match self.select(table, Some(OrderBy::newest_first())).await {
                    Ok(rows) => {
                        let changed = last_seen.get(&table).is_some_and(|previous| *previous != rows);
                        if changed {
                            debug!(%table, "Detected change");
                            let _ = sender.send(ChangeEvent {
                                table,
                                kind: ChangeKind::Update,
                            });
                        }
                        last_seen.insert(table, rows);
                    }
                    Err(e) => warn!(%table, error = %e, "Change poll failed"),
                }
            }
        }
        info!("Polling change feed stopped (no subscribers)");
    }
}

impl Gateway for PostgrestGateway {
    #[instrument(skip(self))]
    async fn select(&self, table: Table, order: Option<OrderBy>) -> Result<Vec<Row>, GatewayError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            query.push(("order", format!("{}.{}", order.column, direction)));
        }
        let response = Self::send(self.request(Method::GET, table).query(&query)).await?;
        let rows = response.json::<Vec<Row>>().await?;
        debug!(row_count = rows.len(), "Selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = Self::send(builder).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, table: Table, patch: Row, id: String) -> Result<(), GatewayError> {
        let builder = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = Self::send(builder).await?;
        ensure_matched(id, response.json::<Vec<Row>>().await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: Table, id: String) -> Result<(), GatewayError> {
        let builder = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let response = Self::send(builder).await?;
        ensure_matched(id, response.json::<Vec<Row>>().await?)
    }

    fn subscribe(&self, tables: &[Table]) -> Subscription {
        let (sender, receiver) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let span = tracing::info_span!("change_poll", tables = ?tables);
        tokio::spawn(self.clone().poll_changes(tables.to_vec(), sender).instrument(span));
        Subscription::new(receiver, tables.to_vec())
    }
}

/// A filtered PATCH or DELETE succeeds even when no row matched; the
/// returned representation tells the two apart.
fn ensure_matched(id: String, rows: Vec<Row>) -> Result<(), GatewayError> {
    if rows.is_empty() {
        debug!(%id, "No row matched");
        return Err(GatewayError::NotFound(id));
    }
    Ok(())
}
