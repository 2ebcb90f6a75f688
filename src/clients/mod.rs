//! Typed clients over the generic resource actors.

#[macro_use]
pub mod macros;
pub mod order_client;
pub mod product_client;

pub use order_client::OrderClient;
pub use product_client::ProductClient;
