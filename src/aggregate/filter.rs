use chrono::{Local, NaiveDate, TimeZone};

use crate::domain::{Order, OrderStatus};

/// Admin order-list filter. Every criterion left as `None` matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of customer name, phone or order id.
    pub search: Option<String>,
    /// Inclusive, compared against the local calendar date of `created_at`.
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.matches_in(order, &Local)
    }

    pub fn matches_in<Tz: TimeZone>(&self, order: &Order, tz: &Tz) -> bool {
        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }

        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let hit = [&order.customer.name, &order.customer.phone, &order.id]
                .iter()
                .any(|field| field.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }

        let created = order.created_at.with_timezone(tz).date_naive();
        if self.created_from.is_some_and(|from| created < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| created > to) {
            return false;
        }
        true
    }

    pub fn apply(&self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|order| self.matches(order)).cloned().collect()
    }
}
