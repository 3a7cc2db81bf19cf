//! Catalog read and write surface.
//!
//! Reads are cache-fronted: check the view store, on miss query the
//! repository, populate, return. Writes commit to the store first and then
//! trigger the invalidation fan-out; a failed write never touches the cache.

use std::sync::Arc;

use metrics::counter;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    CreateProductParams, ProductPage, ProductSearchFilter, ProductsRepo, ProductsWriteRepo,
    UpdateProductParams,
};
use crate::cache::{CacheTrigger, ViewStore};
use crate::domain::entities::ProductRecord;

const METRIC_CACHE_HIT: &str = "bottega_cache_hit_total";
const METRIC_CACHE_MISS: &str = "bottega_cache_miss_total";

/// How many products the storefront's "latest" rail shows.
const LATEST_PRODUCT_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductsRepo>,
    products_write: Arc<dyn ProductsWriteRepo>,
    views: Arc<ViewStore>,
    trigger: Arc<CacheTrigger>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductsRepo>,
        products_write: Arc<dyn ProductsWriteRepo>,
        views: Arc<ViewStore>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            products,
            products_write,
            views,
            trigger,
        }
    }

    /// The five most recently created products, cache-fronted.
    pub async fn latest_products(&self) -> Result<Vec<ProductRecord>, AppError> {
        if let Some(cached) = self.views.get_latest_products() {
            counter!(METRIC_CACHE_HIT, "view" => "latest_products").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "latest_products").increment(1);

        let products = self.products.list_latest(LATEST_PRODUCT_LIMIT).await?;
        self.views.set_latest_products(products.clone());
        Ok(products)
    }

    /// Distinct category names, cache-fronted.
    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        if let Some(cached) = self.views.get_categories() {
            counter!(METRIC_CACHE_HIT, "view" => "categories").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "categories").increment(1);

        let categories = self.products.distinct_categories().await?;
        self.views.set_categories(categories.clone());
        Ok(categories)
    }

    /// The unpaginated admin product listing, cache-fronted.
    pub async fn admin_products(&self) -> Result<Vec<ProductRecord>, AppError> {
        if let Some(cached) = self.views.get_admin_products() {
            counter!(METRIC_CACHE_HIT, "view" => "admin_products").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "admin_products").increment(1);

        let products = self.products.list_all().await?;
        self.views.set_admin_products(products.clone());
        Ok(products)
    }

    /// Point lookup, cache-fronted per id.
    pub async fn product(&self, id: Uuid) -> Result<ProductRecord, AppError> {
        if let Some(cached) = self.views.get_product(id) {
            counter!(METRIC_CACHE_HIT, "view" => "product").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "product").increment(1);

        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.views.set_product(product.clone());
        Ok(product)
    }

    /// Filtered, sorted, paginated public listing. Not cached: the filter
    /// space is unbounded and the admin/latest views cover the hot paths.
    pub async fn search(
        &self,
        filter: &ProductSearchFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, AppError> {
        Ok(self.products.search(filter, page, per_page).await?)
    }

    pub async fn create_product(
        &self,
        mut params: CreateProductParams,
    ) -> Result<ProductRecord, AppError> {
        if params.name.trim().is_empty() {
            return Err(AppError::validation("product name must not be empty"));
        }
        if params.price < 0 {
            return Err(AppError::validation("product price must not be negative"));
        }
        if params.stock < 0 {
            return Err(AppError::validation("initial stock must not be negative"));
        }
        if params.category.trim().is_empty() {
            return Err(AppError::validation("product category must not be empty"));
        }
        params.category = params.category.trim().to_lowercase();

        let product = self.products_write.create_product(params).await?;
        self.trigger.product_saved(product.id).await;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        mut params: UpdateProductParams,
    ) -> Result<ProductRecord, AppError> {
        if let Some(category) = params.category.take() {
            let category = category.trim().to_lowercase();
            if category.is_empty() {
                return Err(AppError::validation("product category must not be empty"));
            }
            params.category = Some(category);
        }

        let product = self.products_write.update_product(id, params).await?;
        self.trigger.product_saved(product.id).await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        self.products_write.delete_product(id).await?;
        self.trigger.product_saved(id).await;
        Ok(())
    }
}
