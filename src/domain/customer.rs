use serde::Serialize;

/// A customer as seen through their orders, keyed by phone number.
///
/// Never stored: rebuilt from the order list on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub phone: String,
    pub name: String,
    pub address: String,
    pub total_spent: u64,
    pub order_count: u32,
}
