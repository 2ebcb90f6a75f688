use indexmap::IndexMap;

use crate::domain::{Customer, Order};

/// Fold orders into one customer per phone number.
///
/// Orders without a phone are skipped. Display fields come from the first
/// order seen for a phone; `total_spent` and `order_count` sum over every
/// order regardless of status. Output follows first-seen order.
pub fn derive_customers(orders: &[Order]) -> Vec<Customer> {
    let mut by_phone: IndexMap<&str, Customer> = IndexMap::new();

    for order in orders {
        let phone = order.customer.phone.trim();
        if phone.is_empty() {
            continue;
        }
        let customer = by_phone.entry(phone).or_insert_with(|| Customer {
            phone: phone.to_string(),
            name: order.customer.name.clone(),
            address: order.customer.address.clone(),
            total_spent: 0,
            order_count: 0,
        });
        customer.total_spent = customer.total_spent.saturating_add(order.total_price);
        customer.order_count = customer.order_count.saturating_add(1);
    }

    by_phone.into_values().collect()
}
