//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::analytics::MonthWindow;
use crate::domain::entities::{CouponRecord, OrderRecord, ProductRecord, UserRecord};
use crate::domain::types::{Gender, OrderStatus, UserRole};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct ProductSearchFilter {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// Inclusive price ceiling.
    pub max_price: Option<i64>,
    pub category: Option<String>,
    pub sort: Option<PriceSort>,
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<ProductRecord>,
    pub total_pages: u64,
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductParams {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

/// Per-category product tally from a grouped count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// The slice of an order the time-series bucketing needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPulse {
    pub total: i64,
    pub created_at: OffsetDateTime,
}

/// Lifetime sums over every order, for the revenue decomposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFinanceTotals {
    pub gross_income: i64,
    pub discount: i64,
    pub shipping_charges: i64,
    pub tax: i64,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_latest(&self, limit: u32) -> Result<Vec<ProductRecord>, RepoError>;

    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError>;

    async fn search(
        &self,
        filter: &ProductSearchFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    async fn distinct_categories(&self) -> Result<Vec<String>, RepoError>;

    async fn count_products(&self) -> Result<u64, RepoError>;

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError>;

    async fn category_counts(&self) -> Result<Vec<CategoryCount>, RepoError>;

    /// Products whose stock is at or below zero.
    async fn count_out_of_stock(&self) -> Result<u64, RepoError>;

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn create_product(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError>;

    async fn update_product(
        &self,
        id: Uuid,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError>;

    /// Add `delta` (negative on order placement) to a product's stock.
    ///
    /// Stock is deliberately not clamped at zero; fails with
    /// [`RepoError::NotFound`] when the product does not exist.
    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateOrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub user_id: Uuid,
    pub items: Vec<CreateOrderItem>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_charges: i64,
    pub discount: i64,
    pub total: i64,
    pub status: OrderStatus,
}

#[async_trait]
pub trait OrdersRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderRecord>, RepoError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError>;

    async fn list_all(&self) -> Result<Vec<OrderRecord>, RepoError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<OrderRecord>, RepoError>;

    async fn count_orders(&self) -> Result<u64, RepoError>;

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepoError>;

    async fn list_pulses_between(&self, window: MonthWindow)
    -> Result<Vec<OrderPulse>, RepoError>;

    async fn list_pulses_since(&self, start: OffsetDateTime)
    -> Result<Vec<OrderPulse>, RepoError>;

    /// Sum of every order total, lifetime.
    async fn lifetime_revenue(&self) -> Result<i64, RepoError>;

    async fn finance_totals(&self) -> Result<OrderFinanceTotals, RepoError>;
}

#[async_trait]
pub trait OrdersWriteRepo: Send + Sync {
    async fn create_order(&self, params: CreateOrderParams) -> Result<OrderRecord, RepoError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus)
    -> Result<OrderRecord, RepoError>;

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub date_of_birth: Date,
    pub role: UserRole,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn count_users(&self) -> Result<u64, RepoError>;

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError>;

    async fn count_by_gender(&self, gender: Gender) -> Result<u64, RepoError>;

    async fn count_by_role(&self, role: UserRole) -> Result<u64, RepoError>;

    async fn list_birth_dates(&self) -> Result<Vec<Date>, RepoError>;

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError>;
}

#[async_trait]
pub trait UsersWriteRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCouponParams {
    pub code: String,
    pub amount: i64,
}

#[async_trait]
pub trait CouponsRepo: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<CouponRecord>, RepoError>;

    async fn list_all(&self) -> Result<Vec<CouponRecord>, RepoError>;
}

#[async_trait]
pub trait CouponsWriteRepo: Send + Sync {
    async fn create_coupon(&self, params: CreateCouponParams) -> Result<CouponRecord, RepoError>;

    async fn delete_by_code(&self, code: &str) -> Result<bool, RepoError>;
}
