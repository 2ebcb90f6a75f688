use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderPatch, OrderStatus};
use crate::order_actor::OrderError;

/// Client for the order store.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, OrderError, order, orders);

impl OrderClient {
    /// Persist a new order. The local list only gains it once the store has
    /// acknowledged the insert.
    #[instrument(skip(self, order), fields(id = %order.id, total = order.total_price))]
    pub async fn create_order(&self, order: Order) -> Result<Order, OrderError> {
        debug!("Sending request");
        if order.id.trim().is_empty() {
            return Err(OrderError::ValidationError("order id is required".to_string()));
        }
        if !order.is_consistent() {
            warn!(subtotal = order.items_subtotal(), "Order total does not match its line items");
        }
        let stored = self.inner.create(order).await?;
        info!("Order stored");
        Ok(stored)
    }

    /// Move an order to any status. Visible immediately, rolled back if the
    /// store rejects the write.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        Ok(self.inner.update(id, OrderPatch { status }).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerInfo, LineItem, PaymentMethod};
    use crate::mock_framework::{create_mock_client, expect_create, expect_patch};

    fn order(id: &str) -> Order {
        Order::new(
            id,
            CustomerInfo::new("Dũng", "0904", "Đà Nẵng"),
            vec![LineItem::new("Rượu Sâm Cau Đỏ Rừng", 380_000, 1)],
            PaymentMethod::Cod,
        )
    }

    #[tokio::test]
    async fn test_create_order_forwards_record() {
        let (inner, mut receiver, _state) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.create_order(order("TH12345")).await });

        let (record, responder) = expect_create(&mut receiver).await.expect("Expected create");
        assert_eq!(record.id, "TH12345");
        responder.send(Ok(record)).unwrap();

        assert_eq!(task.await.unwrap().unwrap().id, "TH12345");
    }

    #[tokio::test]
    async fn test_create_order_requires_id() {
        let (inner, _receiver, _state) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let result = client.create_order(order(" ")).await;
        assert!(matches!(result, Err(OrderError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_status_sends_patch() {
        let (inner, mut receiver, _state) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move {
            client.update_status("TH12345".into(), OrderStatus::Cancelled).await
        });

        let (id, patch, responder) = expect_patch(&mut receiver).await.expect("Expected update");
        assert_eq!(id, "TH12345");
        assert_eq!(patch.status, OrderStatus::Cancelled);
        responder
            .send(Err(crate::actor_framework::FrameworkError::NotFound(id)))
            .unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::NotFound("TH12345".into())));
    }

    #[tokio::test]
    async fn test_closed_actor_maps_to_communication_error() {
        let (inner, receiver, _state) = create_mock_client::<Order>(4);
        drop(receiver);
        let client = OrderClient::new(inner);

        let result = client.fetch_all().await;
        assert!(matches!(result, Err(OrderError::ActorCommunicationError(_))));
    }
}
