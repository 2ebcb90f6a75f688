use serde::Serialize;

/// Back-office dashboard figures, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Σ `total_price` over completed orders.
    pub total_revenue: u64,
    pub pending_count: usize,
    pub customer_total: usize,
    pub total_orders: usize,
    pub total_products: usize,
    /// Completed revenue from orders created today.
    pub daily_revenue: u64,
    pub daily_orders: usize,
    /// Distinct phones with an order created today.
    pub new_customers: usize,
    /// Completed / total orders, e.g. `"66.7%"`; `"0%"` with no orders.
    pub conversion_rate: String,
    /// Completed revenue from orders created within the last month.
    pub recent_revenue: u64,
    /// Customers with more than five orders.
    pub loyal_customers: usize,
}
