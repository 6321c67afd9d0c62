//! Order Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
///
/// `Pending` is the only non-terminal state. Leaving it for `Paid` or
/// `Cancelled` is what settles (and archives) an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {other}")),
        }
    }
}

/// Line item (independent table, cascade-deleted with its order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    /// Category tag: "meat", "ribs", "chicken", ...
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub item_type: String,
    /// Kilograms for meat/ribs, units for chicken
    pub qty: f64,
    /// Unit price in currency unit
    pub price: f64,
    /// qty × price, rounded to 2 decimals
    pub subtotal: f64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Customer name
    pub name: String,
    pub phone: Option<String>,
    /// Sum of item subtotals
    pub total: f64,
    /// Payment method tag: "cash", "card", "pix", ...
    pub payment: String,
    pub status: OrderStatus,
    /// Business date used for daily reporting
    pub order_date: NaiveDate,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Line item input (for create/update, without id/order_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    #[serde(rename = "type")]
    pub item_type: String,
    pub qty: f64,
    pub price: f64,
    /// Optional; when given it must agree with qty × price
    #[serde(default)]
    pub subtotal: Option<f64>,
}

impl LineItemInput {
    pub fn new(item_type: impl Into<String>, qty: f64, price: f64) -> Self {
        Self {
            item_type: item_type.into(),
            qty,
            price,
            subtotal: None,
        }
    }

    pub fn with_subtotal(mut self, subtotal: f64) -> Self {
        self.subtotal = Some(subtotal);
        self
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub items: Vec<LineItemInput>,
    pub payment: String,
    /// YYYY-MM-DD, defaults to today in the business timezone
    #[serde(default)]
    pub order_date: Option<String>,
}

/// Update order payload
///
/// Every field is optional; absent fields keep their stored value.
/// A present `items` list replaces the whole item set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub order_date: Option<String>,
}

impl OrderUpdate {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
        let s: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(s, OrderStatus::Paid);
        assert!(serde_json::from_str::<OrderStatus>("\"PAID\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert!("void".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_line_item_input_uses_type_field() {
        let item: LineItemInput =
            serde_json::from_str(r#"{"type":"meat","qty":2.5,"price":40}"#).unwrap();
        assert_eq!(item.item_type, "meat");
        assert_eq!(item.subtotal, None);

        let json = serde_json::to_value(LineItemInput::new("chicken", 3.0, 25.0)).unwrap();
        assert_eq!(json["type"], "chicken");
    }

    #[test]
    fn test_update_payload_sparse() {
        let update: OrderUpdate = serde_json::from_str(r#"{"status":"paid"}"#).unwrap();
        assert_eq!(update.status, Some(OrderStatus::Paid));
        assert!(update.name.is_none());
        assert!(update.items.is_none());
    }
}
