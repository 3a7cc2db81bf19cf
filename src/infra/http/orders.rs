use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::orders::OrderLine;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct PlaceOrderItem {
    product_id: Uuid,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceOrderBody {
    user_id: Uuid,
    items: Vec<PlaceOrderItem>,
    #[serde(default)]
    discount: i64,
}

pub(super) async fn place(
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderBody>,
) -> Result<Response, AppError> {
    let lines = body
        .items
        .into_iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let order = state
        .orders
        .place_order(body.user_id, lines, body.discount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": order })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct MyOrdersQuery {
    user_id: Uuid,
}

pub(super) async fn mine(
    State(state): State<AppState>,
    Query(query): Query<MyOrdersQuery>,
) -> Result<Response, AppError> {
    let orders = state.orders.my_orders(query.user_id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })).into_response())
}

pub(super) async fn single(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state.orders.order(id).await?;
    Ok(Json(json!({ "success": true, "order": order })).into_response())
}

pub(super) async fn all(State(state): State<AppState>) -> Result<Response, AppError> {
    let orders = state.orders.all_orders().await?;
    Ok(Json(json!({ "success": true, "orders": orders })).into_response())
}

pub(super) async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state.orders.advance_order(id).await?;
    Ok(Json(json!({ "success": true, "order": order })).into_response())
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.orders.delete_order(id).await?;
    Ok(Json(json!({ "success": true, "message": "Order deleted successfully" })).into_response())
}
