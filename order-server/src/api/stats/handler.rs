//! Statistics API Handlers

use axum::{Json, extract::State};
use shared::models::StatsBundle;

use crate::core::ServerState;
use crate::stats;
use crate::utils::AppResult;

/// Counts, revenue, item totals and payment totals over live orders
pub async fn get_stats(State(state): State<ServerState>) -> AppResult<Json<StatsBundle>> {
    let bundle = stats::stats(&state.pool).await?;
    Ok(Json(bundle))
}
