mod actor_framework;
mod admin;
mod aggregate;
mod app_system;
mod change_feed;
mod checkout;
mod clients;
mod config;
mod domain;
mod error;
mod export;
mod gateway;
mod order_actor;
mod product_actor;

#[cfg(test)]
mod mock_framework;

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{error, info, Instrument};

use crate::admin::AdminGate;
use crate::app_system::{setup_tracing, StoreSystem, SystemOptions};
use crate::checkout::{place_order, Cart, CheckoutForm};
use crate::config::AppConfig;
use crate::domain::{OrderStatus, PaymentMethod};
use crate::export::ExportKind;
use crate::gateway::{Gateway, MemoryGateway, PostgrestGateway};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;

    match &config.store {
        Some(store) => {
            info!(url = %store.url, "Using hosted table store");
            let gateway = PostgrestGateway::new(store.url.clone(), store.anon_key.clone(), config.poll_interval);
            run_demo(Arc::new(gateway), &config).await
        }
        None => {
            info!("STORE_URL not set, using in-process store");
            run_demo(Arc::new(MemoryGateway::new()), &config).await
        }
    }
}

/// One storefront checkout followed by an admin session over the same store.
async fn run_demo<G: Gateway>(gateway: Arc<G>, config: &AppConfig) -> Result<(), String> {
    let system = StoreSystem::start(gateway, SystemOptions::from(config));

    let span = tracing::info_span!("storefront");
    let placed = async {
        if let Err(e) = system.product_client.fetch_all().await {
            error!(error = %e, "Catalog unavailable");
        }
        let catalog = system.product_client.products();
        let mut cart = Cart::new();
        for product in catalog.iter().take(2) {
            cart.add(product, 1);
        }
        info!(subtotal = cart.subtotal(), shipping = cart.shipping_fee(), "Cart ready");

        let form = CheckoutForm {
            name: "Nguyễn Văn An".to_string(),
            phone: "0901234567".to_string(),
            address: "12 Hàng Bạc, Hoàn Kiếm, Hà Nội".to_string(),
            note: String::new(),
        };
        place_order(&system.order_client, &mut cart, &form, PaymentMethod::Cod).await
    }
    .instrument(span)
    .await;

    let placed = match placed {
        Ok(order) => {
            info!(order_id = %order.id, total = order.total_price, "Order placed");
            Some(order)
        }
        Err(e) => {
            error!(error = %e, "Checkout failed");
            None
        }
    };

    let span = tracing::info_span!("admin");
    async {
        let gate = AdminGate::new(config.admin_password.clone());
        let session = gate
            .login(config.admin_password.expose_secret(), &system)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(order) = &placed {
            match session.update_order_status(&order.id, OrderStatus::Processing).await {
                Ok(order) => info!(order_id = %order.id, status = order.status.label(), "Order status updated"),
                Err(e) => error!(error = %e, "Status update failed"),
            }
        }

        let stats = session.stats();
        info!(
            total_orders = stats.total_orders,
            pending = stats.pending_count,
            revenue = stats.total_revenue,
            daily_orders = stats.daily_orders,
            conversion = %stats.conversion_rate,
            customers = stats.customer_total,
            "Dashboard"
        );

        let export = session.export(ExportKind::Orders);
        info!(file = %export.file_name, bytes = export.contents.len(), "Orders exported");

        session.logout().await;
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
