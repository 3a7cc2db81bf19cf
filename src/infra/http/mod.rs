//! HTTP surface: thin handlers over the application services.
//!
//! Every read endpoint answers `{"success": true, ...}`; failures map
//! through [`AppError`](crate::application::error::AppError)'s
//! `IntoResponse`. Framing stops here — no handler owns business logic.

mod coupons;
mod orders;
mod products;
mod statistics;
mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};

use crate::application::{
    catalog::CatalogService, coupons::CouponService, error::ErrorReport, orders::OrderService,
    statistics::StatisticsService, users::UserService,
};
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub users: UserService,
    pub coupons: CouponService,
    pub statistics: StatisticsService,
    pub repositories: PostgresRepositories,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Storefront catalog
        .route("/api/v1/products/latest", get(products::latest))
        .route("/api/v1/products/categories", get(products::categories))
        .route("/api/v1/products/search", get(products::search))
        .route("/api/v1/products/{id}", get(products::single))
        // Admin catalog
        .route("/api/v1/admin/products", get(products::admin_list))
        .route("/api/v1/admin/products", post(products::create))
        .route("/api/v1/admin/products/{id}", patch(products::update))
        .route("/api/v1/admin/products/{id}", delete(products::remove))
        // Orders
        .route("/api/v1/orders", post(orders::place))
        .route("/api/v1/orders/my", get(orders::mine))
        .route("/api/v1/orders/{id}", get(orders::single))
        .route("/api/v1/admin/orders", get(orders::all))
        .route("/api/v1/admin/orders/{id}", patch(orders::advance))
        .route("/api/v1/admin/orders/{id}", delete(orders::remove))
        // Users
        .route("/api/v1/users", post(users::create))
        .route("/api/v1/users/{id}", get(users::single))
        // Coupons
        .route("/api/v1/payments/coupon", post(coupons::create))
        .route("/api/v1/payments/coupons", get(coupons::all))
        .route("/api/v1/payments/discount", post(coupons::apply))
        .route("/api/v1/payments/coupon/{code}", delete(coupons::remove))
        // Admin dashboard
        .route(
            "/api/v1/admin/dashboard/statistics",
            get(statistics::overview),
        )
        .route("/api/v1/admin/dashboard/pie", get(statistics::pie))
        .route("/api/v1/admin/dashboard/bar", get(statistics::bar))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Response {
    match state.repositories.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error("infra::http::health", StatusCode::SERVICE_UNAVAILABLE, &err)
                .attach(&mut response);
            response
        }
    }
}
