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
use crate::application::repos::{
    CreateProductParams, PriceSort, ProductSearchFilter, UpdateProductParams,
};

use super::AppState;

const PRODUCTS_PER_PAGE: u32 = 8;

pub(super) async fn latest(State(state): State<AppState>) -> Result<Response, AppError> {
    let products = state.catalog.latest_products().await?;
    Ok(Json(json!({ "success": true, "products": products })).into_response())
}

pub(super) async fn categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state.catalog.categories().await?;
    Ok(Json(json!({ "success": true, "categories": categories })).into_response())
}

pub(super) async fn admin_list(State(state): State<AppState>) -> Result<Response, AppError> {
    let products = state.catalog.admin_products().await?;
    Ok(Json(json!({ "success": true, "products": products })).into_response())
}

pub(super) async fn single(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let product = state.catalog.product(id).await?;
    Ok(Json(json!({ "success": true, "product": product })).into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    search: Option<String>,
    max_price: Option<i64>,
    category: Option<String>,
    sort: Option<String>,
    page: Option<u32>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let sort = match query.sort.as_deref() {
        Some("asc") => Some(PriceSort::Asc),
        Some("desc") => Some(PriceSort::Desc),
        Some(other) => {
            return Err(AppError::validation(format!(
                "unknown sort order `{other}`"
            )));
        }
        None => None,
    };

    let filter = ProductSearchFilter {
        search: query.search,
        max_price: query.max_price,
        category: query.category,
        sort,
    };
    let page = state
        .catalog
        .search(&filter, query.page.unwrap_or(1), PRODUCTS_PER_PAGE)
        .await?;

    Ok(Json(json!({
        "success": true,
        "products": page.items,
        "total_pages": page.total_pages,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductBody {
    name: String,
    price: i64,
    stock: i64,
    category: String,
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductBody>,
) -> Result<Response, AppError> {
    let product = state
        .catalog
        .create_product(CreateProductParams {
            name: body.name,
            price: body.price,
            stock: body.stock,
            category: body.category,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateProductBody {
    name: Option<String>,
    price: Option<i64>,
    stock: Option<i64>,
    category: Option<String>,
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductBody>,
) -> Result<Response, AppError> {
    let product = state
        .catalog
        .update_product(
            id,
            UpdateProductParams {
                name: body.name,
                price: body.price,
                stock: body.stock,
                category: body.category,
            },
        )
        .await?;

    Ok(Json(json!({ "success": true, "product": product })).into_response())
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.catalog.delete_product(id).await?;
    Ok(Json(json!({ "success": true, "message": "Product deleted successfully" })).into_response())
}
