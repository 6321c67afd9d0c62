//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{HistoryRecord, Order, OrderCreate, OrderUpdate};

use crate::core::ServerState;
use crate::db::repository::{history, order};
use crate::utils::{AppError, AppResult};

/// List all orders, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = order::find_all(&state.pool).await?;
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(Json(order))
}

/// Create a pending order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.create(payload).await?;
    Ok(Json(order))
}

/// Sparse update (archives on pending → paid|cancelled)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.update(id, payload).await?;
    Ok(Json(order))
}

/// Delete an order (history is kept)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !state.lifecycle.delete(id).await? {
        return Err(AppError::not_found(format!("Order {id} not found")));
    }
    Ok(Json(true))
}

/// Archive records of one order (the order itself may be gone)
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<HistoryRecord>>> {
    let records = history::find_by_order(&state.pool, id).await?;
    Ok(Json(records))
}
