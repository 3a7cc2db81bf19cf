use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::application::error::AppError;
use crate::application::repos::CreateCouponParams;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CreateCouponBody {
    code: String,
    amount: i64,
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCouponBody>,
) -> Result<Response, AppError> {
    let coupon = state
        .coupons
        .create_coupon(CreateCouponParams {
            code: body.code,
            amount: body.amount,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "coupon": coupon })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct ApplyDiscountBody {
    code: String,
}

pub(super) async fn apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyDiscountBody>,
) -> Result<Response, AppError> {
    let discount = state.coupons.apply_discount(&body.code).await?;
    Ok(Json(json!({ "success": true, "discount": discount })).into_response())
}

pub(super) async fn all(State(state): State<AppState>) -> Result<Response, AppError> {
    let coupons = state.coupons.all_coupons().await?;
    Ok(Json(json!({ "success": true, "coupons": coupons })).into_response())
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    state.coupons.delete_coupon(&code).await?;
    Ok(Json(json!({ "success": true, "message": format!("Coupon {code} deleted successfully") }))
        .into_response())
}
