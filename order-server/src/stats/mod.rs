//! Aggregation Engine
//!
//! Read-only figures over live orders, plus date-ranged totals over the
//! history archive. Each function is its own round-trip; a bundle built
//! from several of them is not a consistent snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{DailySnapshot, HistorySummary, OrderStatus, StatsBundle, StatusCounts};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::repository::{RepoResult, history, order};
use crate::orders::money::{round_money, round_qty, to_decimal};

/// Item types counted as meat (kilograms) in the daily snapshot
pub const MEAT_TYPES: [&str; 2] = ["meat", "ribs"];
/// Item type counted as chicken (units)
pub const CHICKEN_TYPE: &str = "chicken";

/// Order counts per status
pub async fn counts_by_status(pool: &SqlitePool) -> RepoResult<StatusCounts> {
    let mut counts = StatusCounts::default();
    for (status, count) in order::count_by_status(pool).await? {
        match status {
            OrderStatus::Paid => counts.paid = count,
            OrderStatus::Pending => counts.pending = count,
            OrderStatus::Cancelled => counts.cancelled = count,
        }
        counts.total += count;
    }
    Ok(counts)
}

/// Σ total over paid orders
pub async fn revenue(pool: &SqlitePool) -> RepoResult<Decimal> {
    Ok(round_money(to_decimal(order::sum_paid_total(pool).await?)))
}

/// type → Σ qty, cancelled orders excluded
pub async fn item_totals(pool: &SqlitePool) -> RepoResult<BTreeMap<String, Decimal>> {
    Ok(order::sum_qty_by_type(pool)
        .await?
        .into_iter()
        .map(|(item_type, qty)| (item_type, round_qty(to_decimal(qty))))
        .collect())
}

/// payment → Σ total, paid orders only
pub async fn payment_totals(pool: &SqlitePool) -> RepoResult<BTreeMap<String, Decimal>> {
    Ok(order::sum_paid_total_by_payment(pool)
        .await?
        .into_iter()
        .map(|(payment, total)| (payment, round_money(to_decimal(total))))
        .collect())
}

/// All four point-in-time figures
pub async fn stats(pool: &SqlitePool) -> RepoResult<StatsBundle> {
    Ok(StatsBundle {
        counts: counts_by_status(pool).await?,
        revenue: revenue(pool).await?,
        item_totals: item_totals(pool).await?,
        payment_totals: payment_totals(pool).await?,
    })
}

/// Non-cancelled orders of `date` with their digest figures
///
/// `None` when no such order exists.
pub async fn daily_snapshot(pool: &SqlitePool, date: NaiveDate) -> RepoResult<Option<DailySnapshot>> {
    let orders = order::find_active_by_date(pool, date).await?;
    if orders.is_empty() {
        return Ok(None);
    }

    let mut paid_count = 0;
    let mut pending_count = 0;
    let mut revenue = Decimal::ZERO;
    let mut meat_kg = Decimal::ZERO;
    let mut chicken_units = Decimal::ZERO;

    for o in &orders {
        match o.status {
            OrderStatus::Paid => {
                paid_count += 1;
                revenue += to_decimal(o.total);
            }
            OrderStatus::Pending => pending_count += 1,
            OrderStatus::Cancelled => {}
        }
        for item in &o.items {
            if MEAT_TYPES.contains(&item.item_type.as_str()) {
                meat_kg += to_decimal(item.qty);
            } else if item.item_type == CHICKEN_TYPE {
                chicken_units += to_decimal(item.qty);
            }
        }
    }

    Ok(Some(DailySnapshot {
        date,
        orders,
        paid_count,
        pending_count,
        revenue: round_money(revenue),
        meat_kg: round_qty(meat_kg),
        chicken_units: round_qty(chicken_units),
    }))
}

/// Archive totals for an inclusive order_date range (open ends allowed)
pub async fn history_summary(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RepoResult<HistorySummary> {
    let row = history::summary_between(pool, from, to).await?;
    Ok(HistorySummary {
        from,
        to,
        paid_count: row.paid_count,
        cancelled_count: row.cancelled_count,
        revenue: round_money(to_decimal(row.paid_total)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::orders::LifecycleManager;
    use shared::models::{LineItemInput, OrderCreate, OrderUpdate};

    const DAY: &str = "2026-10-17";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn create(name: &str, payment: &str, items: Vec<LineItemInput>) -> OrderCreate {
        OrderCreate {
            name: name.into(),
            phone: None,
            items,
            payment: payment.into(),
            order_date: Some(DAY.into()),
        }
    }

    async fn setup() -> LifecycleManager {
        let db = DbService::in_memory().await.unwrap();
        LifecycleManager::new(db.pool, chrono_tz::America::Sao_Paulo)
    }

    async fn settle(mgr: &LifecycleManager, id: i64, status: OrderStatus) {
        mgr.update(id, OrderUpdate::status(status)).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_store() {
        let mgr = setup().await;
        let bundle = stats(mgr.pool()).await.unwrap();
        assert_eq!(bundle.counts, StatusCounts::default());
        assert_eq!(bundle.revenue, Decimal::ZERO);
        assert!(bundle.item_totals.is_empty());
        assert!(bundle.payment_totals.is_empty());
        assert!(daily_snapshot(mgr.pool(), day()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revenue_and_item_totals_filters() {
        let mgr = setup().await;
        let paid = mgr
            .create(create("A", "pix", vec![LineItemInput::new("chicken", 2.0, 25.0)]))
            .await
            .unwrap();
        let cancelled = mgr
            .create(create("B", "cash", vec![LineItemInput::new("meat", 1.0, 70.0)]))
            .await
            .unwrap();
        mgr.create(create("C", "card", vec![LineItemInput::new("meat", 0.5, 60.0)]))
            .await
            .unwrap();
        settle(&mgr, paid.id, OrderStatus::Paid).await;
        settle(&mgr, cancelled.id, OrderStatus::Cancelled).await;

        let bundle = stats(mgr.pool()).await.unwrap();
        assert_eq!(
            bundle.counts,
            StatusCounts {
                total: 3,
                paid: 1,
                pending: 1,
                cancelled: 1
            }
        );
        // pending and cancelled excluded
        assert_eq!(bundle.revenue, Decimal::new(5000, 2));
        // only cancelled excluded
        assert_eq!(bundle.item_totals.get("meat"), Some(&Decimal::new(5, 1)));
        assert_eq!(bundle.item_totals.get("chicken"), Some(&Decimal::from(2)));
        assert_eq!(bundle.payment_totals.len(), 1);
        assert_eq!(bundle.payment_totals.get("pix"), Some(&Decimal::new(5000, 2)));
    }

    #[tokio::test]
    async fn test_daily_snapshot_scenario() {
        let mgr = setup().await;
        let chicken = mgr
            .create(create("A", "pix", vec![LineItemInput::new("chicken", 3.0, 16.666667)]))
            .await
            .unwrap();
        mgr.create(create("B", "cash", vec![LineItemInput::new("meat", 1.2, 25.0)]))
            .await
            .unwrap();
        settle(&mgr, chicken.id, OrderStatus::Paid).await;

        let snapshot = daily_snapshot(mgr.pool(), day()).await.unwrap().unwrap();
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.paid_count, 1);
        assert_eq!(snapshot.pending_count, 1);
        assert_eq!(snapshot.revenue, Decimal::new(5000, 2));
        assert_eq!(snapshot.meat_kg, Decimal::new(12, 1));
        assert_eq!(snapshot.chicken_units, Decimal::from(3));
    }

    #[tokio::test]
    async fn test_daily_snapshot_ignores_cancelled_and_other_days() {
        let mgr = setup().await;
        let order = mgr
            .create(create("A", "pix", vec![LineItemInput::new("ribs", 1.0, 30.0)]))
            .await
            .unwrap();
        settle(&mgr, order.id, OrderStatus::Cancelled).await;

        let mut other = create("B", "pix", vec![LineItemInput::new("meat", 1.0, 30.0)]);
        other.order_date = Some("2026-10-16".into());
        mgr.create(other).await.unwrap();

        assert!(daily_snapshot(mgr.pool(), day()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ribs_count_as_meat() {
        let mgr = setup().await;
        mgr.create(create(
            "A",
            "pix",
            vec![
                LineItemInput::new("meat", 1.0, 10.0),
                LineItemInput::new("ribs", 0.75, 10.0),
                LineItemInput::new("farofa", 1.0, 5.0),
            ],
        ))
        .await
        .unwrap();

        let snapshot = daily_snapshot(mgr.pool(), day()).await.unwrap().unwrap();
        assert_eq!(snapshot.meat_kg, Decimal::new(175, 2));
        assert_eq!(snapshot.chicken_units, Decimal::ZERO);
        assert_eq!(snapshot.revenue, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_history_summary_survives_deletion() {
        let mgr = setup().await;
        let order = mgr
            .create(create("A", "pix", vec![LineItemInput::new("meat", 2.5, 40.0)]))
            .await
            .unwrap();
        settle(&mgr, order.id, OrderStatus::Paid).await;
        mgr.delete(order.id).await.unwrap();

        let summary = history_summary(mgr.pool(), Some(day()), Some(day())).await.unwrap();
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.cancelled_count, 0);
        assert_eq!(summary.revenue, Decimal::new(10000, 2));
        assert_eq!(revenue(mgr.pool()).await.unwrap(), Decimal::ZERO);
    }
}
