//! Order lifecycle and the order read surface.
//!
//! Placement prices the order, writes it, decrements stock, and only then
//! triggers the invalidation fan-out. Line items are validated against the
//! catalog before anything is written, so a bad item can never leave stock
//! partially decremented.

use std::sync::Arc;

use metrics::counter;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    CreateOrderItem, CreateOrderParams, OrdersRepo, OrdersWriteRepo, ProductsRepo,
    ProductsWriteRepo,
};
use crate::cache::{CacheTrigger, ViewStore};
use crate::domain::entities::OrderRecord;
use crate::domain::types::OrderStatus;

const METRIC_CACHE_HIT: &str = "bottega_cache_hit_total";
const METRIC_CACHE_MISS: &str = "bottega_cache_miss_total";

/// How many of the newest orders the dashboard shows.
pub const RECENT_ORDER_LIMIT: u32 = 4;

/// Checkout pricing rules, from `bottega.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: i64,
    /// Flat shipping fee below the threshold.
    pub shipping_fee: i64,
    /// Tax as a whole-number percentage of the subtotal.
    pub tax_rate_percent: i64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 1000,
            shipping_fee: 200,
            tax_rate_percent: 18,
        }
    }
}

/// A priced order before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuote {
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_charges: i64,
    pub discount: i64,
    pub total: i64,
}

impl OrderQuote {
    /// Price a subtotal under the given rules.
    ///
    /// `total = subtotal + tax + shipping - discount`, fixed here and never
    /// re-derived downstream.
    pub fn price(rules: &PricingRules, subtotal: i64, discount: i64) -> Self {
        let shipping_charges = if subtotal > rules.free_shipping_threshold {
            0
        } else {
            rules.shipping_fee
        };
        let tax = (subtotal * rules.tax_rate_percent + 50) / 100;
        Self {
            subtotal,
            tax,
            shipping_charges,
            discount,
            total: subtotal + tax + shipping_charges - discount,
        }
    }
}

/// One requested line item at placement time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrdersRepo>,
    orders_write: Arc<dyn OrdersWriteRepo>,
    products: Arc<dyn ProductsRepo>,
    products_write: Arc<dyn ProductsWriteRepo>,
    views: Arc<ViewStore>,
    trigger: Arc<CacheTrigger>,
    pricing: PricingRules,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrdersRepo>,
        orders_write: Arc<dyn OrdersWriteRepo>,
        products: Arc<dyn ProductsRepo>,
        products_write: Arc<dyn ProductsWriteRepo>,
        views: Arc<ViewStore>,
        trigger: Arc<CacheTrigger>,
        pricing: PricingRules,
    ) -> Self {
        Self {
            orders,
            orders_write,
            products,
            products_write,
            views,
            trigger,
            pricing,
        }
    }

    /// One user's order history, cache-fronted.
    pub async fn my_orders(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, AppError> {
        if let Some(cached) = self.views.get_user_orders(user_id) {
            counter!(METRIC_CACHE_HIT, "view" => "user_orders").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "user_orders").increment(1);

        let orders = self.orders.list_for_user(user_id).await?;
        self.views.set_user_orders(user_id, orders.clone());
        Ok(orders)
    }

    /// The unpaginated admin order listing, cache-fronted.
    pub async fn all_orders(&self) -> Result<Vec<OrderRecord>, AppError> {
        if let Some(cached) = self.views.get_all_orders() {
            counter!(METRIC_CACHE_HIT, "view" => "all_orders").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "all_orders").increment(1);

        let orders = self.orders.list_all().await?;
        self.views.set_all_orders(orders.clone());
        Ok(orders)
    }

    /// Point lookup, cache-fronted per id.
    pub async fn order(&self, id: Uuid) -> Result<OrderRecord, AppError> {
        if let Some(cached) = self.views.get_order(id) {
            counter!(METRIC_CACHE_HIT, "view" => "order").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "order").increment(1);

        let order = self.orders.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        self.views.set_order(order.clone());
        Ok(order)
    }

    /// Place an order for `user_id`.
    ///
    /// Every referenced product must exist; an unknown id fails the whole
    /// placement before any write. Stock is decremented per line item after
    /// the order commits and may go negative on over-ordering.
    pub async fn place_order(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
        discount: i64,
    ) -> Result<OrderRecord, AppError> {
        if lines.is_empty() {
            return Err(AppError::validation("order must contain at least one item"));
        }
        if discount < 0 {
            return Err(AppError::validation("discount must not be negative"));
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            if line.quantity < 1 {
                return Err(AppError::validation("item quantity must be at least 1"));
            }
            let product = self
                .products
                .find_by_id(line.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "order references unknown product {}",
                        line.product_id
                    ))
                })?;
            items.push(CreateOrderItem {
                product_id: product.id,
                name: product.name,
                quantity: line.quantity,
                price: product.price,
            });
        }

        let subtotal = items.iter().map(|item| item.price * item.quantity).sum();
        let quote = OrderQuote::price(&self.pricing, subtotal, discount);

        let order = self
            .orders_write
            .create_order(CreateOrderParams {
                user_id,
                items,
                subtotal: quote.subtotal,
                tax: quote.tax,
                shipping_charges: quote.shipping_charges,
                discount: quote.discount,
                total: quote.total,
                status: OrderStatus::Processing,
            })
            .await?;

        let mut product_ids = Vec::with_capacity(lines.len());
        for line in &lines {
            self.products_write
                .adjust_stock(line.product_id, -line.quantity)
                .await?;
            product_ids.push(line.product_id);
        }

        self.trigger
            .order_placed(order.id, user_id, product_ids)
            .await;

        Ok(order)
    }

    /// Advance an order one fulfilment step.
    pub async fn advance_order(&self, id: Uuid) -> Result<OrderRecord, AppError> {
        let current = self.orders.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        let order = self
            .orders_write
            .update_status(id, current.status.advanced())
            .await?;
        self.trigger.order_updated(order.id, order.user_id).await;
        Ok(order)
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        let order = self.orders.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        self.orders_write.delete_order(id).await?;
        self.trigger.order_updated(order.id, order.user_id).await;
        Ok(())
    }
}
