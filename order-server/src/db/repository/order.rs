//! Order Repository
//!
//! Rows of `orders` and `order_items`. Multi-row writes take a
//! `&mut SqliteConnection` so the caller decides the transaction boundary.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{LineItem, Order, OrderStatus};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

/// Line item ready for insertion (already validated, subtotal computed)
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub item_type: String,
    pub qty: f64,
    pub price: f64,
    pub subtotal: f64,
}

/// Column values of one `orders` row
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFields {
    pub name: String,
    pub phone: Option<String>,
    pub total: f64,
    pub payment: String,
    pub status: OrderStatus,
    pub order_date: NaiveDate,
}

impl From<&Order> for OrderFields {
    fn from(order: &Order) -> Self {
        Self {
            name: order.name.clone(),
            phone: order.phone.clone(),
            total: order.total,
            payment: order.payment.clone(),
            status: order.status,
            order_date: order.order_date,
        }
    }
}

// ── Reads ───────────────────────────────────────────────────────────

/// All orders, newest id first, items hydrated
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let mut orders = sqlx::query_as::<_, Order>(
        "SELECT id, name, phone, total, payment, status, order_date, created_at, updated_at FROM orders ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    for order in &mut orders {
        order.items = find_items(pool, order.id).await?;
    }
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, id).await
}

/// Load one order with its items on the given connection (or transaction)
pub async fn fetch(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, name, phone, total, payment, status, order_date, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match order {
        Some(mut order) => {
            order.items = find_items(&mut *conn, id).await?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

/// Items of one order in insertion order
pub async fn find_items<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<LineItem>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, LineItem>(
        "SELECT id, order_id, type, qty, price, subtotal FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}

/// Non-cancelled orders of one business date, oldest first
pub async fn find_active_by_date(pool: &SqlitePool, date: NaiveDate) -> RepoResult<Vec<Order>> {
    let mut orders = sqlx::query_as::<_, Order>(
        "SELECT id, name, phone, total, payment, status, order_date, created_at, updated_at FROM orders WHERE order_date = ? AND status != 'cancelled' ORDER BY id",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    for order in &mut orders {
        order.items = find_items(pool, order.id).await?;
    }
    Ok(orders)
}

// ── Writes ──────────────────────────────────────────────────────────

/// Insert the order row, returning the store-assigned id
pub async fn insert(conn: &mut SqliteConnection, fields: &OrderFields, now: i64) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (name, phone, total, payment, status, order_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
    )
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(fields.total)
    .bind(&fields.payment)
    .bind(fields.status)
    .bind(fields.order_date)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Overwrite every mutable column of the order row
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &OrderFields,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET name = ?1, phone = ?2, total = ?3, payment = ?4, status = ?5, order_date = ?6, updated_at = ?7 WHERE id = ?8",
    )
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(fields.total)
    .bind(&fields.payment)
    .bind(fields.status)
    .bind(fields.order_date)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: i64,
    items: &[NewLineItem],
) -> RepoResult<()> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, type, qty, price, subtotal) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(order_id)
        .bind(&item.item_type)
        .bind(item.qty)
        .bind(item.price)
        .bind(item.subtotal)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Delete-all-then-reinsert the item set of an order
pub async fn replace_items(
    conn: &mut SqliteConnection,
    order_id: i64,
    items: &[NewLineItem],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    insert_items(conn, order_id, items).await
}

/// Delete an order (items cascade). Returns whether a row was removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Aggregates ──────────────────────────────────────────────────────

/// (status, count) for every status present
pub async fn count_by_status(pool: &SqlitePool) -> RepoResult<Vec<(OrderStatus, i64)>> {
    let rows = sqlx::query_as::<_, (OrderStatus, i64)>(
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Σ total of paid orders
pub async fn sum_paid_total(pool: &SqlitePool) -> RepoResult<f64> {
    let sum = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(total), 0.0) FROM orders WHERE status = 'paid'",
    )
    .fetch_one(pool)
    .await?;
    Ok(sum)
}

/// (type, Σ qty) over items of non-cancelled orders
pub async fn sum_qty_by_type(pool: &SqlitePool) -> RepoResult<Vec<(String, f64)>> {
    let rows = sqlx::query_as::<_, (String, f64)>(
        "SELECT i.type, SUM(i.qty) FROM order_items i JOIN orders o ON o.id = i.order_id WHERE o.status != 'cancelled' GROUP BY i.type ORDER BY i.type",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// (payment, Σ total) over paid orders
pub async fn sum_paid_total_by_payment(pool: &SqlitePool) -> RepoResult<Vec<(String, f64)>> {
    let rows = sqlx::query_as::<_, (String, f64)>(
        "SELECT payment, SUM(total) FROM orders WHERE status = 'paid' GROUP BY payment ORDER BY payment",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
