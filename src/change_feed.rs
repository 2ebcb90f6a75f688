//! Change-feed bridge: turns persistence change notifications into a full
//! refetch of both stores.

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, Instrument};

use crate::clients::{OrderClient, ProductClient};
use crate::gateway::{Gateway, Subscription, Table};

/// Tables whose changes trigger a resync.
pub const WATCHED_TABLES: [Table; 2] = [Table::Orders, Table::Products];

/// A running subscription. Dropping the bridge aborts the task, which drops
/// the subscription and so unsubscribes.
pub struct ChangeFeedBridge {
    handle: Option<JoinHandle<()>>,
}

impl ChangeFeedBridge {
    pub fn start<G: Gateway>(gateway: &G, orders: OrderClient, products: ProductClient) -> Self {
        let subscription = gateway.subscribe(&WATCHED_TABLES);
        let span = tracing::info_span!("change_feed");
        let handle = tokio::spawn(run(subscription, orders, products).instrument(span));
        info!("Change feed subscribed");
        Self { handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Unsubscribe and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancellation is the expected outcome.
            let _ = handle.await;
            info!("Change feed unsubscribed");
        }
    }
}

impl Drop for ChangeFeedBridge {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(mut subscription: Subscription, orders: OrderClient, products: ProductClient) {
    while let Some(event) = subscription.next().await {
        // One refetch covers everything already queued.
        let coalesced = subscription.drain_pending();
        debug!(table = %event.table, kind = ?event.kind, coalesced, "Change notification");
        resync(&orders, &products).await;
    }
    info!("Change feed closed");
}

/// Refetch both stores. Failures are logged and leave the lists as they were.
#[instrument(skip_all)]
async fn resync(orders: &OrderClient, products: &ProductClient) {
    let (order_result, product_result) = tokio::join!(orders.fetch_all(), products.fetch_all());
    if let Err(e) = order_result {
        error!(error = %e, "Order resync failed");
    }
    if let Err(e) = product_result {
        error!(error = %e, "Product resync failed");
    }
}
