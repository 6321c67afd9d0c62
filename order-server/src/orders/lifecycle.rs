//! Order Lifecycle
//!
//! Every write to an order goes through [`LifecycleManager`]. The only
//! side effect with rules attached is archival: the first transition out of
//! `pending` into `paid` or `cancelled` snapshots the order into `history`,
//! inside the same transaction as the order write itself.

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::{Order, OrderCreate, OrderStatus, OrderUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::repository::order::{NewLineItem, OrderFields};
use crate::db::repository::{history, order};
use crate::orders::money::{order_total, validate_line_items};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_optional, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, time};

/// Whether moving from `prev` to `next` settles the order
///
/// Only `pending → paid` and `pending → cancelled` qualify. Terminal to
/// terminal moves and re-saves of a settled order never archive again.
/// A settled order cannot return to `pending` (see [`check_transition`]).
pub fn should_archive(prev: OrderStatus, next: OrderStatus) -> bool {
    prev == OrderStatus::Pending && next.is_terminal()
}

/// Reject `paid|cancelled → pending`
///
/// Settlement is one-way: reopening would allow a second archive record.
pub fn check_transition(id: i64, prev: OrderStatus, next: OrderStatus) -> AppResult<()> {
    if prev.is_terminal() && next == OrderStatus::Pending {
        return Err(AppError::validation(format!(
            "Order {id} is already {prev} and cannot return to pending"
        )));
    }
    Ok(())
}

/// Order lifecycle manager
#[derive(Clone, Debug)]
pub struct LifecycleManager {
    pool: SqlitePool,
    tz: Tz,
}

impl LifecycleManager {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a `pending` order with its items (one transaction)
    pub async fn create(&self, input: OrderCreate) -> AppResult<Order> {
        let name = input.name.trim();
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        let payment = input.payment.trim();
        validate_required_text(payment, "payment", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&input.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        let items = validate_line_items(&input.items)?;
        let order_date = time::parse_date_or_today(input.order_date.as_deref(), self.tz)?;

        let fields = OrderFields {
            name: name.to_string(),
            phone: normalize_optional(input.phone),
            total: order_total(&items),
            payment: payment.to_string(),
            status: OrderStatus::Pending,
            order_date,
        };

        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let id = order::insert(&mut *tx, &fields, now).await?;
        order::insert_items(&mut *tx, id, &items).await?;
        let created = order::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Order {id} vanished after insert")))?;
        tx.commit().await?;

        tracing::info!(
            order_id = id,
            total = created.total,
            items = created.items.len(),
            order_date = %created.order_date,
            "Order created"
        );
        Ok(created)
    }

    /// Apply a sparse update, archiving on settlement
    ///
    /// Load, merge, item replacement and the optional history insert all
    /// share one transaction: any failure leaves neither the order change
    /// nor an archive row behind.
    pub async fn update(&self, id: i64, changes: OrderUpdate) -> AppResult<Order> {
        let changes = ValidatedUpdate::try_from(changes)?;

        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let existing = order::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;

        let fields = changes.merge_into(&existing);
        check_transition(id, existing.status, fields.status)?;
        order::update(&mut *tx, id, &fields, now).await?;
        if let Some(items) = &changes.items {
            order::replace_items(&mut *tx, id, items).await?;
        }

        let updated = order::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Order {id} vanished during update")))?;

        let archived = should_archive(existing.status, updated.status)
            && !history::exists_for_order(&mut *tx, id).await?;
        if archived {
            history::insert(&mut *tx, &updated, now).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = id,
            from = %existing.status,
            to = %updated.status,
            archived,
            total = updated.total,
            "Order updated"
        );
        Ok(updated)
    }

    /// Delete an order and its items. History is never touched.
    ///
    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let removed = order::delete(&self.pool, id).await?;
        if removed {
            tracing::info!(order_id = id, "Order deleted");
        }
        Ok(removed)
    }
}

/// Update payload after field validation, ready to merge
#[derive(Debug, Default)]
struct ValidatedUpdate {
    name: Option<String>,
    /// `Some(None)` clears the phone
    phone: Option<Option<String>>,
    payment: Option<String>,
    status: Option<OrderStatus>,
    order_date: Option<NaiveDate>,
    items: Option<Vec<NewLineItem>>,
}

impl TryFrom<OrderUpdate> for ValidatedUpdate {
    type Error = AppError;

    fn try_from(update: OrderUpdate) -> Result<Self, Self::Error> {
        let name = match update.name {
            Some(name) => {
                let name = name.trim();
                validate_required_text(name, "name", MAX_NAME_LEN)?;
                Some(name.to_string())
            }
            None => None,
        };
        let payment = match update.payment {
            Some(payment) => {
                let payment = payment.trim();
                validate_required_text(payment, "payment", MAX_SHORT_TEXT_LEN)?;
                Some(payment.to_string())
            }
            None => None,
        };
        let phone = match update.phone {
            Some(phone) => {
                let phone = Some(phone);
                validate_optional_text(&phone, "phone", MAX_SHORT_TEXT_LEN)?;
                Some(normalize_optional(phone))
            }
            None => None,
        };
        let order_date = update
            .order_date
            .as_deref()
            .map(time::parse_date)
            .transpose()?;
        let items = update
            .items
            .as_deref()
            .map(validate_line_items)
            .transpose()?;

        Ok(Self {
            name,
            phone,
            payment,
            status: update.status,
            order_date,
            items,
        })
    }
}

impl ValidatedUpdate {
    /// Absent fields keep the stored value
    fn merge_into(&self, existing: &Order) -> OrderFields {
        let mut fields = OrderFields::from(existing);
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            fields.phone = phone.clone();
        }
        if let Some(payment) = &self.payment {
            fields.payment = payment.clone();
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(date) = self.order_date {
            fields.order_date = date;
        }
        if let Some(items) = &self.items {
            fields.total = order_total(items);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::LineItemInput;

    async fn manager() -> LifecycleManager {
        let db = DbService::in_memory().await.unwrap();
        LifecycleManager::new(db.pool, chrono_tz::America::Sao_Paulo)
    }

    fn meat_order() -> OrderCreate {
        OrderCreate {
            name: "Ana".into(),
            phone: Some("5511999990000".into()),
            items: vec![LineItemInput::new("meat", 2.5, 40.0).with_subtotal(100.0)],
            payment: "pix".into(),
            order_date: Some("2026-10-16".into()),
        }
    }

    async fn history_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_should_archive_matrix() {
        use OrderStatus::*;
        assert!(should_archive(Pending, Paid));
        assert!(should_archive(Pending, Cancelled));
        assert!(!should_archive(Pending, Pending));
        assert!(!should_archive(Paid, Cancelled));
        assert!(!should_archive(Cancelled, Paid));
        assert!(!should_archive(Paid, Paid));
        assert!(!should_archive(Paid, Pending));
    }

    #[test]
    fn test_check_transition() {
        use OrderStatus::*;
        assert!(check_transition(1, Pending, Paid).is_ok());
        assert!(check_transition(1, Pending, Pending).is_ok());
        assert!(check_transition(1, Paid, Cancelled).is_ok());
        assert!(check_transition(1, Paid, Paid).is_ok());
        assert!(check_transition(1, Paid, Pending).unwrap_err().is_validation());
        assert!(check_transition(1, Cancelled, Pending).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_settled_order_cannot_reopen() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap();

        let err = mgr
            .update(
                order.id,
                OrderUpdate {
                    name: Some("Ana Maria".into()),
                    status: Some(OrderStatus::Pending),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // Nothing from the rejected update was written
        let current = order::find_by_id(mgr.pool(), order.id).await.unwrap().unwrap();
        assert_eq!(current.status, OrderStatus::Paid);
        assert_eq!(current.name, "Ana");

        mgr.update(order.id, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap();
        let records = history::find_by_order(mgr.pool(), order.id).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_archive_blocks_second_record() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap();

        // Force the row back to pending behind the manager's back
        sqlx::query("UPDATE orders SET status = 'pending' WHERE id = ?")
            .bind(order.id)
            .execute(mgr.pool())
            .await
            .unwrap();
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Cancelled))
            .await
            .unwrap();

        assert_eq!(history_count(mgr.pool()).await, 1);
        let records = history::find_by_order(mgr.pool(), order.id).await.unwrap();
        assert_eq!(records[0].status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let mgr = manager().await;
        let mut input = meat_order();
        input.items.push(LineItemInput::new("chicken", 3.0, 16.5));

        let order = mgr.create(input).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 149.5);
        let sum: f64 = order.items.iter().map(|i| i.subtotal).sum();
        assert_eq!(order.total, sum);
        assert_eq!(order.items[0].item_type, "meat");
        assert_eq!(order.items[1].item_type, "chicken");
        assert_eq!(order.order_date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[tokio::test]
    async fn test_create_defaults_order_date_to_today() {
        let mgr = manager().await;
        let mut input = meat_order();
        input.order_date = None;
        let order = mgr.create(input).await.unwrap();
        assert_eq!(order.order_date, time::today(chrono_tz::America::Sao_Paulo));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let mgr = manager().await;

        let mut input = meat_order();
        input.name = "   ".into();
        assert!(mgr.create(input).await.unwrap_err().is_validation());

        let mut input = meat_order();
        input.payment = "".into();
        assert!(mgr.create(input).await.unwrap_err().is_validation());

        let mut input = meat_order();
        input.items.clear();
        assert!(mgr.create(input).await.unwrap_err().is_validation());

        let mut input = meat_order();
        input.order_date = Some("16/10/2026".into());
        assert!(mgr.create(input).await.unwrap_err().is_validation());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(mgr.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_update_without_status_never_archives() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();

        let updated = mgr
            .update(
                order.id,
                OrderUpdate {
                    name: Some("Ana Maria".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.payment, "pix");
        assert_eq!(updated.phone.as_deref(), Some("5511999990000"));
        assert_eq!(history_count(mgr.pool()).await, 0);
    }

    #[tokio::test]
    async fn test_settlement_archives_exactly_once() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();

        let paid = mgr
            .update(order.id, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        let records = history::find_by_order(mgr.pool(), order.id).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.status, OrderStatus::Paid);
        assert_eq!(record.total, 100.0);
        assert_eq!(record.name, paid.name);
        assert_eq!(record.created_at, order.created_at);
        let items = record.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, "meat");

        // Terminal → terminal and re-saves never archive again
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Cancelled))
            .await
            .unwrap();
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(history_count(mgr.pool()).await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_post_update_items() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();

        let updated = mgr
            .update(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Cancelled),
                    items: Some(vec![LineItemInput::new("chicken", 2.0, 20.0)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total, 40.0);
        assert_eq!(updated.items.len(), 1);

        let records = history::find_by_order(mgr.pool(), order.id).await.unwrap();
        assert_eq!(records[0].status, OrderStatus::Cancelled);
        assert_eq!(records[0].total, 40.0);
        assert_eq!(records[0].items().unwrap()[0].item_type, "chicken");
    }

    #[tokio::test]
    async fn test_update_validation_and_missing() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();

        let err = mgr
            .update(999, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = mgr
            .update(
                order.id,
                OrderUpdate {
                    items: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = mgr
            .update(
                order.id,
                OrderUpdate {
                    name: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_blank_phone_clears() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();
        let updated = mgr
            .update(
                order.id,
                OrderUpdate {
                    phone: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone, None);
    }

    #[tokio::test]
    async fn test_failed_archive_rolls_back_order_change() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();

        sqlx::query("DROP TABLE history")
            .execute(mgr.pool())
            .await
            .unwrap();

        let err = mgr
            .update(
                order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Paid),
                    items: Some(vec![LineItemInput::new("ribs", 1.0, 10.0)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let reloaded = order::find_by_id(mgr.pool(), order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Pending);
        assert_eq!(reloaded.total, 100.0);
        assert_eq!(reloaded.items[0].item_type, "meat");
    }

    #[tokio::test]
    async fn test_delete_keeps_history() {
        let mgr = manager().await;
        let order = mgr.create(meat_order()).await.unwrap();
        mgr.update(order.id, OrderUpdate::status(OrderStatus::Paid))
            .await
            .unwrap();

        assert!(mgr.delete(order.id).await.unwrap());
        assert!(!mgr.delete(order.id).await.unwrap());
        assert!(order::find_by_id(mgr.pool(), order.id).await.unwrap().is_none());

        let records = history::find_by_order(mgr.pool(), order.id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total, 100.0);
    }
}
