//! History API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{HistoryRecord, HistorySummary};

use crate::core::ServerState;
use crate::db::repository::history;
use crate::stats;
use crate::utils::{AppError, AppResult, time};

/// Upper bound for a single page
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// YYYY-MM-DD, inclusive
    pub from: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub to: Option<String>,
}

/// Archive records, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<HistoryRecord>>> {
    let limit = match query.limit {
        Some(n) if n <= 0 => {
            return Err(AppError::validation(format!("limit must be positive, got {n}")));
        }
        Some(n) => Some(n.min(MAX_LIMIT)),
        None => None,
    };
    let records = history::list(&state.pool, limit).await?;
    Ok(Json(records))
}

/// Paid/cancelled totals over an order_date range
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<HistorySummary>> {
    let from = query.from.as_deref().map(time::parse_date).transpose()?;
    let to = query.to.as_deref().map(time::parse_date).transpose()?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(AppError::validation(format!("from ({f}) is after to ({t})")));
        }
    }
    let summary = stats::history_summary(&state.pool, from, to).await?;
    Ok(Json(summary))
}
