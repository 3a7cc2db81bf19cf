//! Domain entities mirrored from persistent storage.
//!
//! Monetary amounts are whole currency units stored as `i64`.

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::types::{Gender, OrderStatus, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    /// May go negative on over-ordering; stock is not clamped at placement.
    pub stock: i64,
    /// Lower-cased on every write path.
    pub category: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemRecord {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItemRecord>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_charges: i64,
    pub discount: i64,
    /// Always `subtotal + tax + shipping_charges - discount`, fixed at write
    /// time and never re-derived by readers.
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub date_of_birth: Date,
    pub role: UserRole,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponRecord {
    pub id: Uuid,
    pub code: String,
    pub amount: i64,
    pub created_at: OffsetDateTime,
}
