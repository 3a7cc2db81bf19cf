use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CouponsRepo, CouponsWriteRepo, CreateCouponParams, RepoError},
    domain::entities::CouponRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const COUPON_COLUMNS: &str = "id, code, amount, created_at";

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    amount: i64,
    created_at: OffsetDateTime,
}

impl From<CouponRow> for CouponRecord {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            amount: row.amount,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CouponsRepo for PostgresRepositories {
    async fn find_by_code(&self, code: &str) -> Result<Option<CouponRecord>, RepoError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<CouponRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CouponsWriteRepo for PostgresRepositories {
    async fn create_coupon(&self, params: CreateCouponParams) -> Result<CouponRecord, RepoError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "INSERT INTO coupons (code, amount) VALUES ($1, $2) RETURNING {COUPON_COLUMNS}"
        ))
        .bind(params.code)
        .bind(params.amount)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM coupons WHERE code = $1")
            .bind(code)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
