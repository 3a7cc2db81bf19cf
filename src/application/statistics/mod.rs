//! Dashboard statistics aggregation.
//!
//! Each payload is computed only on a cache miss for its view, from
//! concurrent repository sub-queries joined before combining; a failed
//! sub-query fails the whole computation and nothing is cached. Payloads
//! are stored typed and returned unchanged on hits until invalidated.

mod charts;
mod overview;
mod types;

pub use types::{
    AgeGroups, BarCharts, CategoryShare, ChangePercent, DashboardOverview, GenderRatio,
    LifetimeCounts, MonthlyOrderSeries, OrderFulfilment, PieCharts, RecentOrder,
    RevenueDistribution, RoleSplit, StockAvailability,
};

use std::sync::Arc;

use metrics::counter;
use time::OffsetDateTime;

use crate::application::error::AppError;
use crate::application::repos::{OrdersRepo, ProductsRepo, UsersRepo};
use crate::cache::ViewStore;

const METRIC_CACHE_HIT: &str = "bottega_cache_hit_total";
const METRIC_CACHE_MISS: &str = "bottega_cache_miss_total";

#[derive(Clone)]
pub struct StatisticsService {
    products: Arc<dyn ProductsRepo>,
    orders: Arc<dyn OrdersRepo>,
    users: Arc<dyn UsersRepo>,
    views: Arc<ViewStore>,
}

impl StatisticsService {
    pub fn new(
        products: Arc<dyn ProductsRepo>,
        orders: Arc<dyn OrdersRepo>,
        users: Arc<dyn UsersRepo>,
        views: Arc<ViewStore>,
    ) -> Self {
        Self {
            products,
            orders,
            users,
            views,
        }
    }

    /// The dashboard overview, cache-fronted.
    pub async fn overview(&self, now: OffsetDateTime) -> Result<DashboardOverview, AppError> {
        if let Some(cached) = self.views.get_dashboard_overview() {
            counter!(METRIC_CACHE_HIT, "view" => "dashboard_overview").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "dashboard_overview").increment(1);

        let overview = overview::compute(&self.products, &self.orders, &self.users, now).await?;
        self.views.set_dashboard_overview(overview.clone());
        Ok(overview)
    }

    /// The pie-chart payload, cache-fronted.
    pub async fn pie_charts(&self, now: OffsetDateTime) -> Result<PieCharts, AppError> {
        if let Some(cached) = self.views.get_pie_charts() {
            counter!(METRIC_CACHE_HIT, "view" => "pie_charts").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "pie_charts").increment(1);

        let charts = charts::compute_pie(&self.products, &self.orders, &self.users, now).await?;
        self.views.set_pie_charts(charts.clone());
        Ok(charts)
    }

    /// The bar-chart payload, cache-fronted.
    pub async fn bar_charts(&self, now: OffsetDateTime) -> Result<BarCharts, AppError> {
        if let Some(cached) = self.views.get_bar_charts() {
            counter!(METRIC_CACHE_HIT, "view" => "bar_charts").increment(1);
            return Ok(cached);
        }
        counter!(METRIC_CACHE_MISS, "view" => "bar_charts").increment(1);

        let charts = charts::compute_bar(&self.products, &self.orders, &self.users, now).await?;
        self.views.set_bar_charts(charts.clone());
        Ok(charts)
    }
}
