pub mod customer;
pub mod order;
pub mod product;
pub mod stats;
pub mod wire;

pub use customer::*;
pub use order::*;
pub use product::*;
pub use stats::*;

pub use crate::product_actor::ProductPatch;
