//! History Repository (settled order archive)
//!
//! Append-only. Nothing here updates or deletes a record.

use super::RepoResult;
use chrono::NaiveDate;
use shared::models::{HistoryRecord, ItemSnapshot, Order};
use sqlx::{SqliteConnection, SqlitePool};

/// Snapshot `order` (with its items) into the archive
///
/// Must run inside the transaction that settled the order.
pub async fn insert(
    conn: &mut SqliteConnection,
    order: &Order,
    resolved_at: i64,
) -> RepoResult<i64> {
    let snapshot: Vec<ItemSnapshot> = order.items.iter().map(ItemSnapshot::from).collect();
    let items_json = serde_json::to_string(&snapshot)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO history (order_id, name, phone, total, payment, status, order_date, created_at, items_json, resolved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING id",
    )
    .bind(order.id)
    .bind(&order.name)
    .bind(&order.phone)
    .bind(order.total)
    .bind(&order.payment)
    .bind(order.status)
    .bind(order.order_date)
    .bind(order.created_at)
    .bind(&items_json)
    .bind(resolved_at)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Whether `order_id` already has an archive record
pub async fn exists_for_order(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM history WHERE order_id = ? LIMIT 1")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Newest records first; `None` returns everything
pub async fn list(pool: &SqlitePool, limit: Option<i64>) -> RepoResult<Vec<HistoryRecord>> {
    // LIMIT -1 means no limit in SQLite
    let limit = limit.unwrap_or(-1);
    let records = sqlx::query_as::<_, HistoryRecord>(
        "SELECT id, order_id, name, phone, total, payment, status, order_date, created_at, items_json, resolved_at FROM history ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<HistoryRecord>> {
    let records = sqlx::query_as::<_, HistoryRecord>(
        "SELECT id, order_id, name, phone, total, payment, status, order_date, created_at, items_json, resolved_at FROM history WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Raw archive totals for an inclusive order_date range
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SummaryRow {
    pub paid_count: i64,
    pub cancelled_count: i64,
    pub paid_total: f64,
}

/// Paid/cancelled counts and paid revenue, optionally bounded by order_date
pub async fn summary_between(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RepoResult<SummaryRow> {
    let row = sqlx::query_as::<_, SummaryRow>(
        "SELECT \
            COALESCE(SUM(CASE WHEN status = 'paid' THEN 1 ELSE 0 END), 0) AS paid_count, \
            COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled_count, \
            COALESCE(SUM(CASE WHEN status = 'paid' THEN total ELSE 0.0 END), 0.0) AS paid_total \
         FROM history \
         WHERE (?1 IS NULL OR order_date >= ?1) AND (?2 IS NULL OR order_date <= ?2)",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
