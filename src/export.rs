//! Spreadsheet-friendly CSV exports of the back-office lists.
//!
//! Files start with a UTF-8 BOM, use `,` and CRLF, and quote any field that
//! contains a comma, a double quote or a line break.

use std::borrow::Cow;
use std::fmt::{self, Display};

use chrono::{Local, NaiveDate, TimeZone};

use crate::domain::{Customer, Order, Product};

const BOM: char = '\u{feff}';
const LINE_END: &str = "\r\n";

pub const ORDER_HEADERS: [&str; 10] = [
    "Mã đơn",
    "Ngày tạo",
    "Trạng thái",
    "Phương thức",
    "Khách hàng",
    "SĐT",
    "Địa chỉ",
    "Số lượng",
    "Chi tiết",
    "Tổng tiền",
];

pub const PRODUCT_HEADERS: [&str; 10] = [
    "ID",
    "Tên",
    "Danh mục",
    "Giá",
    "Mô tả",
    "Xuất xứ",
    "Thể tích",
    "Độ cồn",
    "Thời gian ủ",
    "Ảnh",
];

pub const CUSTOMER_HEADERS: [&str; 7] = ["ID", "Tên", "SĐT", "Email", "Địa chỉ", "Tổng đơn", "Tổng chi"];

/// `H:M:S D/M/YYYY`, 24-hour.
const CREATED_AT_FORMAT: &str = "%H:%M:%S %-d/%-m/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Orders,
    Products,
    Customers,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Orders => "orders",
            ExportKind::Products => "products",
            ExportKind::Customers => "customers",
        }
    }
}

impl Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<kind>_YYYY-MM-DD.csv`
pub fn export_file_name(kind: ExportKind, date: NaiveDate) -> String {
    format!("{kind}_{}.csv", date.format("%Y-%m-%d"))
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

struct CsvBuilder {
    out: String,
    rows: usize,
}

impl CsvBuilder {
    fn new(headers: &[&str]) -> Self {
        let mut builder = Self {
            out: String::from(BOM),
            rows: 0,
        };
        builder.row(headers.iter().copied());
        builder
    }

    fn row<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        if self.rows > 0 {
            self.out.push_str(LINE_END);
        }
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.out.push_str(&escape(field));
        }
        self.rows += 1;
    }

    fn finish(self) -> String {
        self.out
    }
}

pub fn export_orders_csv(orders: &[Order]) -> String {
    export_orders_csv_in(orders, &Local)
}

/// Order export with `created_at` rendered in `tz`.
pub fn export_orders_csv_in<Tz>(orders: &[Order], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut csv = CsvBuilder::new(&ORDER_HEADERS);
    for order in orders {
        let created = order.created_at.with_timezone(tz).format(CREATED_AT_FORMAT).to_string();
        let details = order
            .items
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(" | ");
        let quantity = order.item_count().to_string();
        let total = order.total_price.to_string();
        csv.row([
            order.id.as_str(),
            created.as_str(),
            order.status.as_str(),
            order.payment_method.code(),
            order.customer.name.as_str(),
            order.customer.phone.as_str(),
            order.customer.address.as_str(),
            quantity.as_str(),
            details.as_str(),
            total.as_str(),
        ]);
    }
    csv.finish()
}

pub fn export_products_csv(products: &[Product]) -> String {
    let mut csv = CsvBuilder::new(&PRODUCT_HEADERS);
    for product in products {
        let price = product.price.to_string();
        csv.row([
            product.id.as_str(),
            product.name.as_str(),
            product.category.as_str(),
            price.as_str(),
            product.description.as_str(),
            product.origin.as_deref().unwrap_or_default(),
            product.volume.as_deref().unwrap_or_default(),
            product.alcohol_content.as_deref().unwrap_or_default(),
            product.aging_time.as_deref().unwrap_or_default(),
            product.image.as_str(),
        ]);
    }
    csv.finish()
}

/// Customers have no id or email of their own; the phone fills the ID
/// column and Email stays blank.
pub fn export_customers_csv(customers: &[Customer]) -> String {
    let mut csv = CsvBuilder::new(&CUSTOMER_HEADERS);
    for customer in customers {
        let order_count = customer.order_count.to_string();
        let total_spent = customer.total_spent.to_string();
        csv.row([
            customer.phone.as_str(),
            customer.name.as_str(),
            customer.phone.as_str(),
            "",
            customer.address.as_str(),
            order_count.as_str(),
            total_spent.as_str(),
        ]);
    }
    csv.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerInfo, LineItem, PaymentMethod};
    use chrono::{DateTime, FixedOffset, Utc};

    fn sample_order() -> Order {
        let mut order = Order::new(
            "TH54321",
            CustomerInfo::new("Nguyễn \"Bác\" Ba", "0912345678", "5 Trần Phú, Hà Đông, Hà Nội"),
            vec![
                LineItem::new("Rượu Ba Kích Tím Quảng Ninh", 450_000, 2),
                LineItem::new("Phí vận chuyển", 35_000, 1),
            ],
            PaymentMethod::Cod,
        );
        order.created_at = DateTime::parse_from_rfc3339("2024-05-01T02:05:09Z").unwrap().with_timezone(&Utc);
        order
    }

    #[test]
    fn test_escape_only_when_needed() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_orders_csv_layout() {
        let hanoi = FixedOffset::east_opt(7 * 3600).unwrap();
        let csv = export_orders_csv_in(&[sample_order()], &hanoi);

        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ORDER_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "TH54321,09:05:09 1/5/2024,pending,COD,\"Nguyễn \"\"Bác\"\" Ba\",0912345678,\
             \"5 Trần Phú, Hà Đông, Hà Nội\",3,Rượu Ba Kích Tím Quảng Ninh x2 | Phí vận chuyển x1,935000"
        );
    }

    #[test]
    fn test_products_csv_blank_optionals() {
        let mut product = Product::new("6", "Rượu Táo Mèo Yên Bái", "Trái Cây Rừng", 180_000);
        product.volume = Some("2 Lít".into());
        let csv = export_products_csv(&[product]);

        let row = csv.split("\r\n").nth(1).unwrap();
        assert_eq!(row, "6,Rượu Táo Mèo Yên Bái,Trái Cây Rừng,180000,,,2 Lít,,,");
    }

    #[test]
    fn test_customers_csv_uses_phone_as_id() {
        let customer = Customer {
            phone: "0901".into(),
            name: "Lan".into(),
            address: "Huế".into(),
            total_spent: 1_200_000,
            order_count: 3,
        };
        let csv = export_customers_csv(&[customer]);
        assert!(csv.ends_with("0901,Lan,0901,,Huế,3,1200000"));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(export_customers_csv(&[]), format!("\u{feff}{}", CUSTOMER_HEADERS.join(",")));
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_file_name(ExportKind::Orders, date), "orders_2024-05-01.csv");
    }
}
