use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductPatch};
use crate::product_actor::ProductError;

/// Client for the product store.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product, products);

impl ProductClient {
    /// Persist a new product. Leave `id` empty to let the store assign one.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add_product(&self, product: Product) -> Result<Product, ProductError> {
        debug!("Sending request");
        if product.name.trim().is_empty() {
            return Err(ProductError::ValidationError("product name is required".to_string()));
        }
        let stored = self.inner.create(product).await?;
        info!(id = %stored.id, "Product stored");
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        if patch.is_empty() {
            return self.find_product(&id).ok_or(ProductError::NotFound(id));
        }
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ProductError::ValidationError("product name cannot be blank".to_string()));
        }
        Ok(self.inner.update(id, patch).await?)
    }
}
