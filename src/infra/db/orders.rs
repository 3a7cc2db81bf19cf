use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateOrderParams, OrderFinanceTotals, OrderPulse, OrdersRepo, OrdersWriteRepo, RepoError,
    },
    domain::analytics::MonthWindow,
    domain::entities::{OrderItemRecord, OrderRecord},
    domain::types::OrderStatus,
};

use super::{PostgresRepositories, map_sqlx_error};

const ORDER_COLUMNS: &str =
    "id, user_id, subtotal, tax, shipping_charges, discount, total, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    subtotal: i64,
    tax: i64,
    shipping_charges: i64,
    discount: i64,
    total: i64,
    status: OrderStatus,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl OrderRow {
    fn into_record(self, items: Vec<OrderItemRecord>) -> OrderRecord {
        OrderRecord {
            id: self.id,
            user_id: self.user_id,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping_charges: self.shipping_charges,
            discount: self.discount,
            total: self.total,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    quantity: i64,
    price: i64,
}

impl PostgresRepositories {
    async fn load_items(
        &self,
        order_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<OrderItemRecord>>, RepoError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, name, quantity, price \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(order_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut grouped: HashMap<Uuid, Vec<OrderItemRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(OrderItemRecord {
                product_id: row.product_id,
                name: row.name,
                quantity: row.quantity,
                price: row.price,
            });
        }
        Ok(grouped)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<OrderRecord>, RepoError> {
        let ids = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_record(order_items)
            })
            .collect())
    }
}

#[async_trait]
impl OrdersRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderRecord>, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let mut items = self.load_items(vec![row.id]).await?;
                let order_items = items.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_record(order_items)))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.assemble(rows).await
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.assemble(rows).await
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<OrderRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.assemble(rows).await
    }

    async fn count_orders(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
            .bind(status)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn list_pulses_between(
        &self,
        window: MonthWindow,
    ) -> Result<Vec<OrderPulse>, RepoError> {
        let rows: Vec<(i64, OffsetDateTime)> = sqlx::query_as(
            "SELECT total, created_at FROM orders WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(total, created_at)| OrderPulse { total, created_at })
            .collect())
    }

    async fn list_pulses_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OrderPulse>, RepoError> {
        let rows: Vec<(i64, OffsetDateTime)> =
            sqlx::query_as("SELECT total, created_at FROM orders WHERE created_at >= $1")
                .bind(start)
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(total, created_at)| OrderPulse { total, created_at })
            .collect())
    }

    async fn lifetime_revenue(&self) -> Result<i64, RepoError> {
        sqlx::query_scalar("SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn finance_totals(&self) -> Result<OrderFinanceTotals, RepoError> {
        let (gross_income, discount, shipping_charges, tax): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COALESCE(SUM(total), 0)::BIGINT, \
                        COALESCE(SUM(discount), 0)::BIGINT, \
                        COALESCE(SUM(shipping_charges), 0)::BIGINT, \
                        COALESCE(SUM(tax), 0)::BIGINT \
                 FROM orders",
            )
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(OrderFinanceTotals {
            gross_income,
            discount,
            shipping_charges,
            tax,
        })
    }
}

#[async_trait]
impl OrdersWriteRepo for PostgresRepositories {
    async fn create_order(&self, params: CreateOrderParams) -> Result<OrderRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, subtotal, tax, shipping_charges, discount, total, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(params.user_id)
        .bind(params.subtotal)
        .bind(params.tax)
        .bind(params.shipping_charges)
        .bind(params.discount)
        .bind(params.total)
        .bind(params.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for item in &params.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        let items = params
            .items
            .into_iter()
            .map(|item| OrderItemRecord {
                product_id: item.product_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        Ok(row.into_record(items))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        let mut items = self.load_items(vec![row.id]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        Ok(row.into_record(order_items))
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
