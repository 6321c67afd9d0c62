//! History Model (settled order archive)

use super::order::{LineItem, OrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of an order, written once when it leaves `pending`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HistoryRecord {
    pub id: i64,
    /// Originating order (may no longer exist)
    pub order_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub total: f64,
    pub payment: String,
    /// Status at settlement: `paid` or `cancelled`
    pub status: OrderStatus,
    pub order_date: NaiveDate,
    /// Original creation time of the order (Unix millis)
    pub created_at: i64,
    /// JSON array of [`ItemSnapshot`]
    pub items_json: String,
    /// Archival time (Unix millis)
    pub resolved_at: i64,
}

impl HistoryRecord {
    /// Decode the frozen line items
    pub fn items(&self) -> Result<Vec<ItemSnapshot>, serde_json::Error> {
        serde_json::from_str(&self.items_json)
    }
}

/// Line item as frozen into `items_json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    #[serde(rename = "type")]
    pub item_type: String,
    pub qty: f64,
    pub price: f64,
    pub subtotal: f64,
}

impl From<&LineItem> for ItemSnapshot {
    fn from(item: &LineItem) -> Self {
        Self {
            item_type: item.item_type.clone(),
            qty: item.qty,
            price: item.price,
            subtotal: item.subtotal,
        }
    }
}
