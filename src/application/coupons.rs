//! Coupon management and discount lookup.
//!
//! Coupons never feed a cached view, so nothing here touches the cache.

use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::repos::{CouponsRepo, CouponsWriteRepo, CreateCouponParams};
use crate::domain::entities::CouponRecord;

#[derive(Clone)]
pub struct CouponService {
    coupons: Arc<dyn CouponsRepo>,
    coupons_write: Arc<dyn CouponsWriteRepo>,
}

impl CouponService {
    pub fn new(coupons: Arc<dyn CouponsRepo>, coupons_write: Arc<dyn CouponsWriteRepo>) -> Self {
        Self {
            coupons,
            coupons_write,
        }
    }

    pub async fn create_coupon(&self, params: CreateCouponParams) -> Result<CouponRecord, AppError> {
        if params.code.trim().is_empty() {
            return Err(AppError::validation("coupon code must not be empty"));
        }
        if params.amount <= 0 {
            return Err(AppError::validation("coupon amount must be positive"));
        }
        Ok(self.coupons_write.create_coupon(params).await?)
    }

    /// The discount amount for a code; an unknown code is a validation
    /// failure, not a 404, matching the checkout flow's contract.
    pub async fn apply_discount(&self, code: &str) -> Result<i64, AppError> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::validation("invalid coupon code"))?;
        Ok(coupon.amount)
    }

    pub async fn all_coupons(&self) -> Result<Vec<CouponRecord>, AppError> {
        Ok(self.coupons.list_all().await?)
    }

    pub async fn delete_coupon(&self, code: &str) -> Result<(), AppError> {
        if self.coupons_write.delete_by_code(code).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
