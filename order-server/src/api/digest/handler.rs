//! Digest API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::DigestOutcome;

use crate::core::ServerState;
use crate::utils::{AppResult, time};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// YYYY-MM-DD, defaults to today in the business timezone
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub date: NaiveDate,
    /// false when there is nothing to report
    pub has_orders: bool,
    pub text: String,
}

/// Build the digest without sending it
pub async fn preview(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<PreviewResponse>> {
    let date = time::parse_date_or_today(query.date.as_deref(), state.config.timezone)?;
    let digest = state.digest.preview(date).await?;
    Ok(Json(PreviewResponse {
        date,
        has_orders: digest.is_report(),
        text: digest.text(),
    }))
}

/// Build and try to deliver the digest
pub async fn send(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DigestOutcome>> {
    let date = time::parse_date_or_today(query.date.as_deref(), state.config.timezone)?;
    let outcome = state.digest.send(date).await?;
    Ok(Json(outcome))
}
