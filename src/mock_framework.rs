//! # Mock Framework
//!
//! Utilities for testing stores and clients in isolation.
//!
//! [`create_mock_gateway`] returns a [`MockGateway`] plus a receiver of every
//! call made against it. Tests pull calls off the receiver with
//! [`expect_select`], [`expect_insert`], [`expect_update`] or
//! [`expect_delete`] and answer them through the bundled responder, which
//! lets them observe state while a write is still in flight.
//!
//! [`create_mock_client`] does the same one level up, for code that talks to
//! a [`ResourceClient`] without a running actor.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::actor_framework::{Record, ResourceClient, ResourceRequest, Response, Snapshot};
use crate::error::GatewayError;
use crate::gateway::{
    ChangeEvent, ChangeKind, Gateway, OrderBy, Row, Subscription, Table, CHANGE_FEED_CAPACITY,
};

pub type Reply<T> = oneshot::Sender<Result<T, GatewayError>>;

#[derive(Debug)]
pub enum GatewayCall {
    Select {
        table: Table,
        order: Option<OrderBy>,
        respond_to: Reply<Vec<Row>>,
    },
    Insert {
        table: Table,
        rows: Vec<Row>,
        respond_to: Reply<Vec<Row>>,
    },
    Update {
        table: Table,
        patch: Row,
        id: String,
        respond_to: Reply<()>,
    },
    Delete {
        table: Table,
        id: String,
        respond_to: Reply<()>,
    },
}

#[derive(Clone)]
pub struct MockGateway {
    calls: mpsc::Sender<GatewayCall>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MockGateway {
    /// Push a change notification to every subscriber.
    pub fn notify(&self, table: Table, kind: ChangeKind) {
        let _ = self.changes.send(ChangeEvent { table, kind });
    }

    async fn call<R>(&self, build: impl FnOnce(Reply<R>) -> GatewayCall) -> Result<R, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.calls
            .send(build(respond_to))
            .await
            .map_err(|_| GatewayError::Transport("mock receiver dropped".into()))?;
        response
            .await
            .map_err(|_| GatewayError::Transport("mock responder dropped".into()))?
    }
}

impl Gateway for MockGateway {
    async fn select(&self, table: Table, order: Option<OrderBy>) -> Result<Vec<Row>, GatewayError> {
        self.call(|respond_to| GatewayCall::Select { table, order, respond_to }).await
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, GatewayError> {
        self.call(|respond_to| GatewayCall::Insert { table, rows, respond_to }).await
    }

    async fn update(&self, table: Table, patch: Row, id: String) -> Result<(), GatewayError> {
        self.call(|respond_to| GatewayCall::Update { table, patch, id, respond_to }).await
    }

    async fn delete(&self, table: Table, id: String) -> Result<(), GatewayError> {
        self.call(|respond_to| GatewayCall::Delete { table, id, respond_to }).await
    }

    fn subscribe(&self, tables: &[Table]) -> Subscription {
        Subscription::new(self.changes.subscribe(), tables.to_vec())
    }
}

/// Creates a mock gateway and the receiver its calls arrive on.
pub fn create_mock_gateway(buffer_size: usize) -> (MockGateway, mpsc::Receiver<GatewayCall>) {
    let (calls, receiver) = mpsc::channel(buffer_size);
    let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
    (MockGateway { calls, changes }, receiver)
}

pub async fn expect_select(
    receiver: &mut mpsc::Receiver<GatewayCall>,
) -> Option<(Table, Reply<Vec<Row>>)> {
    match receiver.recv().await {
        Some(GatewayCall::Select { table, respond_to, .. }) => Some((table, respond_to)),
        _ => None,
    }
}

pub async fn expect_insert(
    receiver: &mut mpsc::Receiver<GatewayCall>,
) -> Option<(Table, Vec<Row>, Reply<Vec<Row>>)> {
    match receiver.recv().await {
        Some(GatewayCall::Insert { table, rows, respond_to }) => Some((table, rows, respond_to)),
        _ => None,
    }
}

pub async fn expect_update(
    receiver: &mut mpsc::Receiver<GatewayCall>,
) -> Option<(Table, String, Row, Reply<()>)> {
    match receiver.recv().await {
        Some(GatewayCall::Update { table, patch, id, respond_to }) => Some((table, id, patch, respond_to)),
        _ => None,
    }
}

pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<GatewayCall>,
) -> Option<(Table, String, Reply<()>)> {
    match receiver.recv().await {
        Some(GatewayCall::Delete { table, id, respond_to }) => Some((table, id, respond_to)),
        _ => None,
    }
}

/// Creates a client wired to a receiver instead of an actor, plus the
/// sender that controls what the client's snapshot shows.
pub fn create_mock_client<T: Record>(
    buffer_size: usize,
) -> (
    ResourceClient<T>,
    mpsc::Receiver<ResourceRequest<T>>,
    watch::Sender<Snapshot<T>>,
) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (state, snapshots) = watch::channel(Arc::new(Vec::new()));
    (ResourceClient::new(sender, snapshots), receiver, state)
}

pub async fn expect_create<T: Record>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { record, respond_to }) => Some((record, respond_to)),
        _ => None,
    }
}

pub async fn expect_patch<T: Record>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(String, T::Patch, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, ProductPatch};

    #[tokio::test]
    async fn test_mock_gateway_answers_through_responder() {
        let (gateway, mut calls) = create_mock_gateway(4);

        let task = tokio::spawn(async move { gateway.delete(Table::Products, "3".into()).await });

        let (table, id, responder) = expect_delete(&mut calls).await.expect("Expected delete");
        assert_eq!(table, Table::Products);
        assert_eq!(id, "3");
        responder.send(Err(GatewayError::NotFound("3".into()))).unwrap();

        assert_eq!(task.await.unwrap(), Err(GatewayError::NotFound("3".into())));
    }

    #[tokio::test]
    async fn test_notify_reaches_subscribers_of_that_table() {
        let (gateway, _calls) = create_mock_gateway(4);
        let mut subscription = gateway.subscribe(&[Table::Orders]);

        gateway.notify(Table::Products, ChangeKind::Insert);
        gateway.notify(Table::Orders, ChangeKind::Delete);

        let event = subscription.next().await.unwrap();
        assert_eq!(event, ChangeEvent { table: Table::Orders, kind: ChangeKind::Delete });
    }

    #[tokio::test]
    async fn test_mock_client_receives_patch() {
        let (client, mut receiver, state) = create_mock_client::<Product>(4);
        state.send_replace(Arc::new(vec![Product::new("1", "Rượu Đinh Lăng", "Rượu Củ", 1_500_000)]));
        assert_eq!(client.snapshot().len(), 1);

        let task = tokio::spawn(async move {
            let patch = ProductPatch {
                price: Some(1_400_000),
                ..ProductPatch::default()
            };
            client.update("1".into(), patch).await
        });

        let (id, patch, responder) = expect_patch(&mut receiver).await.expect("Expected update");
        assert_eq!(id, "1");
        assert_eq!(patch.price, Some(1_400_000));
        let mut updated = Product::new("1", "Rượu Đinh Lăng", "Rượu Củ", 1_400_000);
        updated.description = "x".into();
        responder.send(Ok(updated)).unwrap();

        assert_eq!(task.await.unwrap().unwrap().price, 1_400_000);
    }
}
