//! Storefront cart and checkout.
//!
//! Checkout writes exactly one `pending` order. The shipping fee travels as
//! its own line item so `total_price` always equals the line-item sum.

use indexmap::IndexMap;
use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::clients::OrderClient;
use crate::domain::{CustomerInfo, LineItem, Order, PaymentMethod, Product};
use crate::order_actor::OrderError;

/// Orders at or above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: u64 = 1_500_000;
pub const SHIPPING_FEE: u64 = 35_000;
pub const SHIPPING_LINE_NAME: &str = "Phí vận chuyển";
pub const ORDER_ID_PREFIX: &str = "TH";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Order could not be placed: {0}")]
    Order(#[from] OrderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

/// Shopping cart keyed by product id, in the order products were added.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: IndexMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.lines
            .entry(product.id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(quantity))
            .or_insert_with(|| CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity,
            });
    }

    /// Set a line's quantity; zero removes it.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(line) = self.lines.get_mut(product_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.lines.shift_remove(product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).fold(0, u64::saturating_add)
    }

    pub fn subtotal(&self) -> u64 {
        self.lines
            .values()
            .map(|line| line.price.saturating_mul(u64::from(line.quantity)))
            .fold(0, u64::saturating_add)
    }

    pub fn shipping_fee(&self) -> u64 {
        shipping_fee(self.subtotal())
    }

    pub fn total(&self) -> u64 {
        self.subtotal() + self.shipping_fee()
    }
}

pub fn shipping_fee(subtotal: u64) -> u64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        SHIPPING_FEE
    }
}

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub note: String,
}

impl CheckoutForm {
    /// Name, phone and address are required; the note is optional.
    pub fn validate(&self) -> Result<CustomerInfo, CheckoutError> {
        let required = |value: &str, field: &'static str| {
            let value = value.trim();
            if value.is_empty() {
                Err(CheckoutError::MissingField(field))
            } else {
                Ok(value.to_string())
            }
        };
        let mut customer = CustomerInfo::new(
            required(&self.name, "name")?,
            required(&self.phone, "phone")?,
            required(&self.address, "address")?,
        );
        let note = self.note.trim();
        if !note.is_empty() {
            customer.note = Some(note.to_string());
        }
        Ok(customer)
    }
}

/// `TH` followed by five random digits.
pub fn generate_order_id() -> String {
    let n: u32 = rand::rng().random_range(10_000..=99_999);
    format!("{ORDER_ID_PREFIX}{n}")
}

/// Build the pending order for a cart without persisting it.
pub fn build_order(
    id: impl Into<String>,
    cart: &Cart,
    form: &CheckoutForm,
    payment_method: PaymentMethod,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = form.validate()?;

    let mut items: Vec<LineItem> = cart
        .lines()
        .map(|line| LineItem::new(line.name.clone(), line.price, line.quantity))
        .collect();
    let fee = cart.shipping_fee();
    if fee > 0 {
        items.push(LineItem::new(SHIPPING_LINE_NAME, fee, 1));
    }

    Ok(Order::new(id, customer, items, payment_method))
}

/// Validate, submit and, once the store has acknowledged the order, empty
/// the cart. On failure the cart is left untouched for a retry.
#[instrument(skip_all, fields(lines = cart.lines.len(), payment = %payment_method))]
pub async fn place_order(
    orders: &OrderClient,
    cart: &mut Cart,
    form: &CheckoutForm,
    payment_method: PaymentMethod,
) -> Result<Order, CheckoutError> {
    let order = build_order(generate_order_id(), cart, form, payment_method)?;
    let order_id = order.id.clone();

    match orders.create_order(order).await {
        Ok(stored) => {
            info!(%order_id, total = stored.total_price, "Order placed");
            cart.clear();
            Ok(stored)
        }
        Err(e) => {
            warn!(%order_id, error = %e, "Order placement failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::domain::OrderStatus;
    use crate::error::GatewayError;
    use crate::mock_framework::{create_mock_client, expect_create};

    fn product(id: &str, price: u64) -> Product {
        Product::new(id, format!("Rượu {id}"), "Dược Liệu Quý", price)
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: " Ngọc ".into(),
            phone: "0905123456".into(),
            address: "12 Lê Lợi, Huế".into(),
            note: String::new(),
        }
    }

    #[test]
    fn test_cart_merges_and_removes_lines() {
        let mut cart = Cart::new();
        cart.add(&product("1", 450_000), 1);
        cart.add(&product("1", 450_000), 2);
        cart.add(&product("2", 180_000), 1);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), 1_530_000);

        cart.set_quantity("1", 0);
        assert_eq!(cart.lines().count(), 1);
        assert_eq!(cart.subtotal(), 180_000);
    }

    #[test]
    fn test_shipping_threshold() {
        assert_eq!(shipping_fee(1_499_999), SHIPPING_FEE);
        assert_eq!(shipping_fee(1_500_000), 0);
    }

    #[test]
    fn test_build_order_adds_shipping_line_below_threshold() {
        let mut cart = Cart::new();
        cart.add(&product("2", 450_000), 2);

        let order = build_order("TH12345", &cart, &form(), PaymentMethod::Cod).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, 935_000);
        assert_eq!(order.items.last().unwrap().name, SHIPPING_LINE_NAME);
        assert!(order.is_consistent());
        assert_eq!(order.customer.name, "Ngọc");
        assert_eq!(order.customer.note, None);
    }

    #[test]
    fn test_build_order_ships_free_above_threshold() {
        let mut cart = Cart::new();
        cart.add(&product("3", 2_200_000), 1);

        let order = build_order("TH12345", &cart, &form(), PaymentMethod::Bank).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price, 2_200_000);
    }

    #[test]
    fn test_build_order_rejects_empty_cart_and_missing_fields() {
        let mut cart = Cart::new();
        assert_eq!(
            build_order("TH1", &cart, &form(), PaymentMethod::Cod).unwrap_err(),
            CheckoutError::EmptyCart
        );

        cart.add(&product("1", 100), 1);
        let mut incomplete = form();
        incomplete.address = "  ".into();
        assert_eq!(
            build_order("TH1", &cart, &incomplete, PaymentMethod::Cod).unwrap_err(),
            CheckoutError::MissingField("address")
        );
    }

    #[test]
    fn test_generated_ids_have_prefix_and_five_digits() {
        for _ in 0..100 {
            let id = generate_order_id();
            assert!(id.starts_with("TH"));
            let digits: u32 = id[2..].parse().unwrap();
            assert!((10_000..=99_999).contains(&digits));
        }
    }

    #[tokio::test]
    async fn test_failed_placement_keeps_cart() {
        let (inner, mut receiver, _state) = create_mock_client::<Order>(4);
        let orders = OrderClient::new(inner);
        let mut cart = Cart::new();
        cart.add(&product("1", 450_000), 1);

        let responder = tokio::spawn(async move {
            let (_, respond_to) = expect_create(&mut receiver).await.unwrap();
            respond_to
                .send(Err(FrameworkError::Persistence(GatewayError::Transport("offline".into()))))
                .unwrap();
        });

        let result = place_order(&orders, &mut cart, &form(), PaymentMethod::Cod).await;
        responder.await.unwrap();

        assert!(matches!(result, Err(CheckoutError::Order(OrderError::DatabaseError(_)))));
        assert_eq!(cart.item_count(), 1);
    }
}
