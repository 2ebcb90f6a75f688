//! Pure derivations over the order and product lists.
//!
//! Nothing here touches a store: every function takes slices and returns a
//! fresh value, so the result only depends on its inputs (and on `now` for
//! the date-scoped figures).

pub mod customers;
pub mod filter;
pub mod stats;

pub use customers::derive_customers;
pub use filter::OrderFilter;
pub use stats::{derive_stats, derive_stats_at};
