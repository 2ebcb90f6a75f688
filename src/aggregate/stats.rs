use std::collections::HashSet;

use chrono::{DateTime, Local, Months, TimeZone};

use crate::domain::{Customer, DashboardStats, Order, OrderStatus, Product};

/// Customers with more orders than this count as loyal.
pub const LOYAL_ORDER_THRESHOLD: u32 = 5;

/// Dashboard figures as of the current local time.
pub fn derive_stats(orders: &[Order], products: &[Product], customers: &[Customer]) -> DashboardStats {
    derive_stats_at(orders, products, customers, &Local::now())
}

/// Dashboard figures as of `now`. "Today" means the calendar date of `now`
/// in its own time zone, so the daily figures reset at midnight rather than
/// over a rolling 24 hours.
pub fn derive_stats_at<Tz: TimeZone>(
    orders: &[Order],
    products: &[Product],
    customers: &[Customer],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let tz = now.timezone();
    let today = now.date_naive();
    let local_date = |order: &Order| order.created_at.with_timezone(&tz).date_naive();
    let is_today = |order: &Order| local_date(order) == today;

    let completed = || orders.iter().filter(|o| o.status == OrderStatus::Completed);
    let completed_count = completed().count();
    let total_revenue = completed().map(|o| o.total_price).fold(0, u64::saturating_add);

    let daily_orders = orders.iter().filter(|o| is_today(*o)).count();
    let daily_revenue = completed()
        .filter(|o| is_today(*o))
        .map(|o| o.total_price)
        .fold(0, u64::saturating_add);
    let new_customers = orders
        .iter()
        .filter(|o| is_today(*o) && !o.customer.phone.trim().is_empty())
        .map(|o| o.customer.phone.trim())
        .collect::<HashSet<_>>()
        .len();

    let recent_revenue: u64 = match today.checked_sub_months(Months::new(1)).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(cutoff) => completed()
            .filter(|o| o.created_at.with_timezone(&tz).naive_local() > cutoff)
            .map(|o| o.total_price)
            .fold(0, u64::saturating_add),
        None => total_revenue,
    };

    let customer_total = customers
        .iter()
        .map(|c| c.phone.as_str())
        .collect::<HashSet<_>>()
        .len();

    DashboardStats {
        total_revenue,
        pending_count: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
        customer_total,
        total_orders: orders.len(),
        total_products: products.len(),
        daily_revenue,
        daily_orders,
        new_customers,
        conversion_rate: conversion_rate(completed_count, orders.len()),
        recent_revenue,
        loyal_customers: customers
            .iter()
            .filter(|c| c.order_count > LOYAL_ORDER_THRESHOLD)
            .count(),
    }
}

fn conversion_rate(completed: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", completed as f64 / total as f64 * 100.0)
}
