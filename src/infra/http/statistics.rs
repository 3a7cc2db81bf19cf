use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::OffsetDateTime;

use crate::application::error::AppError;

use super::AppState;

pub(super) async fn overview(State(state): State<AppState>) -> Result<Response, AppError> {
    let statistics = state.statistics.overview(OffsetDateTime::now_utc()).await?;
    Ok(Json(json!({ "success": true, "statistics": statistics })).into_response())
}

pub(super) async fn pie(State(state): State<AppState>) -> Result<Response, AppError> {
    let charts = state.statistics.pie_charts(OffsetDateTime::now_utc()).await?;
    Ok(Json(json!({ "success": true, "charts": charts })).into_response())
}

pub(super) async fn bar(State(state): State<AppState>) -> Result<Response, AppError> {
    let charts = state.statistics.bar_charts(OffsetDateTime::now_utc()).await?;
    Ok(Json(json!({ "success": true, "charts": charts })).into_response())
}
