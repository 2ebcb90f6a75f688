//! Back-office session.
//!
//! The shared password only gates access to the dashboard API; it is not an
//! access-control boundary. The store must enforce its own row security.

use chrono::Local;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::actor_framework::Snapshot;
use crate::aggregate::{derive_customers, derive_stats, OrderFilter};
use crate::app_system::StoreSystem;
use crate::change_feed::ChangeFeedBridge;
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{Customer, DashboardStats, Order, OrderStatus, Product, ProductPatch};
use crate::export::{
    export_customers_csv, export_file_name, export_orders_csv, export_products_csv, ExportKind,
};
use crate::gateway::Gateway;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error("Mật khẩu không chính xác")]
    InvalidPassword,
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Product(#[from] ProductError),
}

/// Checks the shared back-office password.
pub struct AdminGate {
    password: SecretString,
}

impl AdminGate {
    pub fn new(password: SecretString) -> Self {
        Self { password }
    }

    pub fn verify(&self, attempt: &str) -> bool {
        constant_time_compare(self.password.expose_secret(), attempt)
    }

    /// Open a session: subscribe to the change feed, then load both lists.
    /// A failed initial load is logged and the session still opens with
    /// whatever the stores already hold.
    #[instrument(skip_all)]
    pub async fn login<G: Gateway>(
        &self,
        attempt: &str,
        system: &StoreSystem<G>,
    ) -> Result<AdminSession, AdminError> {
        if !self.verify(attempt) {
            warn!("Admin login rejected");
            return Err(AdminError::InvalidPassword);
        }

        let orders = system.order_client.clone();
        let products = system.product_client.clone();
        let bridge = ChangeFeedBridge::start(system.gateway().as_ref(), orders.clone(), products.clone());
        let session = AdminSession {
            orders,
            products,
            bridge: Some(bridge),
        };

        if let Err(e) = session.refresh_all().await {
            error!(error = %e, "Initial load failed");
        }
        info!("Admin session opened");
        Ok(session)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// A CSV file ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

/// An authenticated back-office view over both stores. Holds the change
/// feed subscription until [`logout`](Self::logout) or drop.
pub struct AdminSession {
    orders: OrderClient,
    products: ProductClient,
    bridge: Option<ChangeFeedBridge>,
}

impl AdminSession {
    pub fn is_live(&self) -> bool {
        self.bridge.as_ref().is_some_and(ChangeFeedBridge::is_running)
    }

    /// Refetch both lists. Both fetches run; the first error is returned.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Result<(), AdminError> {
        let (orders, products) = tokio::join!(self.orders.fetch_all(), self.products.fetch_all());
        orders?;
        products?;
        Ok(())
    }

    pub fn orders(&self) -> Snapshot<Order> {
        self.orders.orders()
    }

    pub fn products(&self) -> Snapshot<Product> {
        self.products.products()
    }

    pub fn customers(&self) -> Vec<Customer> {
        derive_customers(&self.orders())
    }

    pub fn stats(&self) -> DashboardStats {
        let orders = self.orders();
        let customers = derive_customers(&orders);
        derive_stats(&orders, &self.products(), &customers)
    }

    pub fn filtered_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        filter.apply(&self.orders())
    }

    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order, AdminError> {
        Ok(self.orders.update_status(id.to_string(), status).await?)
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), AdminError> {
        Ok(self.orders.delete_order(id.to_string()).await?)
    }

    pub async fn add_product(&self, product: Product) -> Result<Product, AdminError> {
        Ok(self.products.add_product(product).await?)
    }

    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product, AdminError> {
        Ok(self.products.update_product(id.to_string(), patch).await?)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), AdminError> {
        Ok(self.products.delete_product(id.to_string()).await?)
    }

    pub fn export(&self, kind: ExportKind) -> CsvExport {
        let contents = match kind {
            ExportKind::Orders => export_orders_csv(&self.orders()),
            ExportKind::Products => export_products_csv(&self.products()),
            ExportKind::Customers => export_customers_csv(&self.customers()),
        };
        CsvExport {
            file_name: export_file_name(kind, Local::now().date_naive()),
            contents,
        }
    }

    /// End the session and unsubscribe from the change feed.
    pub async fn logout(mut self) {
        if let Some(bridge) = self.bridge.take() {
            bridge.stop().await;
        }
        info!("Admin session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_system::SystemOptions;
    use crate::gateway::MemoryGateway;
    use std::sync::Arc;

    fn gate() -> AdminGate {
        AdminGate::new(SecretString::from("mat-khau-93".to_string()))
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[tokio::test]
    async fn test_wrong_password_opens_nothing() {
        let gateway = Arc::new(MemoryGateway::new());
        let system = StoreSystem::start(gateway.clone(), SystemOptions::default());

        let result = gate().login("mat-khau", &system).await;
        assert!(matches!(result, Err(AdminError::InvalidPassword)));
        assert_eq!(gateway.subscriber_count(), 0);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_login_loads_and_logout_unsubscribes() {
        let gateway = Arc::new(MemoryGateway::new());
        let system = StoreSystem::start(gateway.clone(), SystemOptions::default());

        let session = gate().login("mat-khau-93", &system).await.unwrap();
        assert!(session.is_live());
        assert_eq!(gateway.subscriber_count(), 1);
        assert_eq!(session.products().len(), 6);
        assert_eq!(session.stats().total_products, 6);

        let export = session.export(ExportKind::Products);
        assert!(export.file_name.starts_with("products_"));
        assert_eq!(export.contents.split("\r\n").count(), 7);

        session.logout().await;
        assert_eq!(gateway.subscriber_count(), 0);
        system.shutdown().await.unwrap();
    }
}
