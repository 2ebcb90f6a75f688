use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, Instrument};

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient};
use crate::config::AppConfig;
use crate::domain::{Order, Product};
use crate::gateway::Gateway;
use crate::product_actor::CatalogFallback;

pub const DEFAULT_ACTOR_BUFFER: usize = 32;

/// Knobs for [`StoreSystem::start`].
#[derive(Debug, Clone, Copy)]
pub struct SystemOptions {
    pub actor_buffer: usize,
    pub catalog_fallback: CatalogFallback,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            actor_buffer: DEFAULT_ACTOR_BUFFER,
            catalog_fallback: CatalogFallback::Seed,
        }
    }
}

impl From<&AppConfig> for SystemOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            actor_buffer: config.actor_buffer,
            catalog_fallback: config.catalog_fallback,
        }
    }
}

/// Starts the order and product stores over one gateway and owns their
/// tasks until [`shutdown`](Self::shutdown).
pub struct StoreSystem<G: Gateway> {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    gateway: Arc<G>,
    handles: Vec<JoinHandle<()>>,
}

impl<G: Gateway> StoreSystem<G> {
    pub fn start(gateway: Arc<G>, options: SystemOptions) -> Self {
        let (order_actor, order_resource_client) =
            ResourceActor::<Order, G>::new(options.actor_buffer, gateway.clone());
        let order_client = OrderClient::new(order_resource_client);
        let order_handle = tokio::spawn(order_actor.run().instrument(tracing::info_span!("order_store")));

        let (product_actor, product_resource_client) =
            ResourceActor::<Product, G>::new(options.actor_buffer, gateway.clone());
        let product_actor = product_actor.with_fallback(options.catalog_fallback.catalog());
        let product_client = ProductClient::new(product_resource_client);
        let product_handle =
            tokio::spawn(product_actor.run().instrument(tracing::info_span!("product_store")));

        info!(buffer = options.actor_buffer, fallback = ?options.catalog_fallback, "Store system started");

        Self {
            order_client,
            product_client,
            gateway,
            handles: vec![order_handle, product_handle],
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Stop both actors and wait for their tasks. Clients that are still
    /// held elsewhere get `ActorCommunicationError` from then on.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        if let Err(e) = self.order_client.shutdown().await {
            error!(error = %e, "Order store already stopped");
        }
        if let Err(e) = self.product_client.shutdown().await {
            error!(error = %e, "Product store already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
