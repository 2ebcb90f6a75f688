use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;

/// Order lifecycle states.
///
/// Any state may be reassigned to any other: an administrator can move a
/// completed order back to pending. `Completed` and `Cancelled` are terminal
/// only by business convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Back-office display label.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Chờ duyệt",
            OrderStatus::Processing => "Đang giao",
            OrderStatus::Completed => "Hoàn tất",
            OrderStatus::Cancelled => "Đã hủy",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// How the customer chose to pay. Checkout writes `COD`, `BANK` or `VISA`;
/// anything else already in the store is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cod,
    Bank,
    Visa,
    Other(String),
}

impl PaymentMethod {
    pub fn code(&self) -> &str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Bank => "BANK",
            PaymentMethod::Visa => "VISA",
            PaymentMethod::Other(code) => code,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Other(String::new())
    }
}

impl From<String> for PaymentMethod {
    fn from(code: String) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "cod" => PaymentMethod::Cod,
            "bank" => PaymentMethod::Bank,
            "visa" => PaymentMethod::Visa,
            _ => PaymentMethod::Other(code),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.code().to_string()
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Customer details copied into every order (not a foreign key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub address: String,
    #[serde(default, deserialize_with = "wire::optional_text", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            note: None,
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::amount")]
    pub price: u64,
    #[serde(default, deserialize_with = "wire::quantity")]
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: u64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// A customer purchase record.
///
/// Only `status` changes after creation; see [`OrderPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(alias = "paymentMethod", default)]
    pub payment_method: PaymentMethod,
    #[serde(alias = "totalPrice", default, deserialize_with = "wire::amount")]
    pub total_price: u64,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        payment_method: PaymentMethod,
    ) -> Self {
        let total_price = items.iter().map(LineItem::line_total).fold(0, u64::saturating_add);
        Self {
            id: id.into(),
            created_at: Utc::now(),
            status: OrderStatus::Pending,
            payment_method,
            total_price,
            customer,
            items,
        }
    }

    /// Σ price × quantity over the line items.
    pub fn items_subtotal(&self) -> u64 {
        self.items.iter().map(LineItem::line_total).fold(0, u64::saturating_add)
    }

    /// Whether `total_price` still matches the line items. Rows are not
    /// re-validated on read; this only reports.
    pub fn is_consistent(&self) -> bool {
        self.total_price == self.items_subtotal()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).fold(0, u64::saturating_add)
    }
}

/// The only mutation an order accepts after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderPatch {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!("Completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_keeps_unknown_codes() {
        assert_eq!(PaymentMethod::from("cod".to_string()), PaymentMethod::Cod);
        assert_eq!(PaymentMethod::from("BANK".to_string()), PaymentMethod::Bank);
        assert_eq!(
            PaymentMethod::from("momo".to_string()),
            PaymentMethod::Other("momo".to_string())
        );
        assert_eq!(String::from(PaymentMethod::Visa), "VISA");
    }

    #[test]
    fn test_new_order_is_pending_and_totals_items() {
        let order = Order::new(
            "TH12345",
            CustomerInfo::new("An", "0900000001", "Hà Nội"),
            vec![LineItem::new("Ba Kích", 450_000, 2), LineItem::new("Sim Rừng", 250_000, 1)],
            PaymentMethod::Cod,
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, 1_150_000);
        assert!(order.is_consistent());
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_decodes_legacy_camel_case_row() {
        let order: Order = serde_json::from_value(json!({
            "id": 17,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "status": "processing",
            "paymentMethod": "momo",
            "totalPrice": "900000",
            "customer": {"name": "Bình", "phone": "0911", "address": null},
            "items": [{"id": "2", "name": "Ba Kích", "price": 450000, "quantity": 2, "image": "x"}]
        }))
        .unwrap();

        assert_eq!(order.id, "17");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_method, PaymentMethod::Other("momo".into()));
        assert_eq!(order.total_price, 900_000);
        assert_eq!(order.customer.address, "");
        assert!(order.is_consistent());
    }

    #[test]
    fn test_inconsistent_total_is_reported_not_rejected() {
        let order: Order = serde_json::from_value(json!({
            "id": "TH9",
            "created_at": "2024-05-01T10:00:00+07:00",
            "status": "pending",
            "total_price": 1,
            "items": [{"name": "Táo Mèo", "price": 180000, "quantity": 1}]
        }))
        .unwrap();
        assert!(!order.is_consistent());
    }

    #[test]
    fn test_oversized_row_total_fails_to_decode() {
        let result = serde_json::from_value::<Order>(json!({
            "id": "TH10",
            "created_at": "2024-05-01T10:00:00Z",
            "status": "completed",
            "total_price": "1e19",
            "items": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_line_total_saturates() {
        let item = LineItem::new("Rượu", u64::MAX / 2, 3);
        assert_eq!(item.line_total(), u64::MAX);
    }
}
