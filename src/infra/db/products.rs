use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CategoryCount, CreateProductParams, PriceSort, ProductPage, ProductSearchFilter,
        ProductsRepo, ProductsWriteRepo, RepoError, UpdateProductParams,
    },
    domain::analytics::MonthWindow,
    domain::entities::ProductRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, category, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: i64,
    stock: i64,
    category: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_filter_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductSearchFilter) {
    if let Some(search) = &filter.search {
        qb.push(" AND name ILIKE ");
        qb.push_bind(format!("%{search}%"));
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ");
        qb.push_bind(max_price);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category.clone());
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_latest(&self, limit: u32) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(
        &self,
        filter: &ProductSearchFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepoError> {
        let per_page = per_page.max(1);
        let offset = i64::from(page.max(1) - 1) * i64::from(per_page);

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"
        ));
        push_filter_conditions(&mut qb, filter);
        match filter.sort {
            Some(PriceSort::Asc) => qb.push(" ORDER BY price ASC"),
            Some(PriceSort::Desc) => qb.push(" ORDER BY price DESC"),
            None => qb.push(" ORDER BY created_at DESC"),
        };
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(per_page));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products WHERE TRUE");
        push_filter_conditions(&mut count_qb, filter);
        let matching: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ProductPage {
            items: rows.into_iter().map(Into::into).collect(),
            total_pages: (matching as u64).div_ceil(u64::from(per_page)),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products ORDER BY category",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_products(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>, RepoError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM products GROUP BY category ORDER BY category",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category,
                count: count as u64,
            })
            .collect())
    }

    async fn count_out_of_stock(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock <= 0")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        sqlx::query_scalar::<_, OffsetDateTime>(
            "SELECT created_at FROM products WHERE created_at >= $1",
        )
        .bind(start)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn create_product(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, price, stock, category) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.price)
        .bind(params.stock)
        .bind(params.category)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 price = COALESCE($3, price), \
                 stock = COALESCE($4, stock), \
                 category = COALESCE($5, category), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(params.name)
        .bind(params.price)
        .bind(params.stock)
        .bind(params.category)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(Into::into).ok_or(RepoError::NotFound)
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE products SET stock = stock + $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(delta)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
