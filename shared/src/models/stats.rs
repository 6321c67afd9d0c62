//! Statistics & digest models

use super::order::Order;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: i64,
    pub paid: i64,
    pub pending: i64,
    pub cancelled: i64,
}

/// Point-in-time statistics over all live orders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    pub counts: StatusCounts,
    /// Σ total of paid orders
    pub revenue: Decimal,
    /// Σ qty per item type, cancelled orders excluded
    pub item_totals: BTreeMap<String, Decimal>,
    /// Σ total per payment method, paid orders only
    pub payment_totals: BTreeMap<String, Decimal>,
}

/// Non-cancelled orders of one business date, with digest figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub orders: Vec<Order>,
    pub paid_count: i64,
    pub pending_count: i64,
    pub revenue: Decimal,
    /// meat + ribs, kilograms
    pub meat_kg: Decimal,
    pub chicken_units: Decimal,
}

/// Settled orders in the archive over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub paid_count: i64,
    pub cancelled_count: i64,
    /// Σ total of records archived as paid
    pub revenue: Decimal,
}

/// Result of a manual digest send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestOutcome {
    pub delivered: bool,
    pub preview: String,
}
