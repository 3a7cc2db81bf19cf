//! Derived-view cache storage.
//!
//! One typed slot per [`ViewKey`](super::ViewKey) namespace: listings and
//! dashboard payloads are singletons, per-id lookups sit behind LRU maps.
//! Entries only leave through explicit invalidation (or LRU capacity);
//! there is no TTL. Invalidating an absent entry is a no-op.

use std::sync::RwLock;

use lru::LruCache;
use uuid::Uuid;

use crate::application::statistics::{BarCharts, DashboardOverview, PieCharts};
use crate::domain::entities::{OrderRecord, ProductRecord};

use super::config::CacheConfig;
use super::keys::ViewKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// In-memory storage for every cached derived view.
pub struct ViewStore {
    // Singletons (no eviction needed)
    latest_products: RwLock<Option<Vec<ProductRecord>>>,
    categories: RwLock<Option<Vec<String>>>,
    admin_products: RwLock<Option<Vec<ProductRecord>>>,
    all_orders: RwLock<Option<Vec<OrderRecord>>>,
    dashboard_overview: RwLock<Option<DashboardOverview>>,
    pie_charts: RwLock<Option<PieCharts>>,
    bar_charts: RwLock<Option<BarCharts>>,

    // KV caches (with LRU eviction)
    products_by_id: RwLock<LruCache<Uuid, ProductRecord>>,
    orders_by_id: RwLock<LruCache<Uuid, OrderRecord>>,
    orders_by_user: RwLock<LruCache<Uuid, Vec<OrderRecord>>>,
}

impl ViewStore {
    /// Create a new view store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            latest_products: RwLock::new(None),
            categories: RwLock::new(None),
            admin_products: RwLock::new(None),
            all_orders: RwLock::new(None),
            dashboard_overview: RwLock::new(None),
            pie_charts: RwLock::new(None),
            bar_charts: RwLock::new(None),
            products_by_id: RwLock::new(LruCache::new(config.product_limit_non_zero())),
            orders_by_id: RwLock::new(LruCache::new(config.order_limit_non_zero())),
            orders_by_user: RwLock::new(LruCache::new(config.user_order_list_limit_non_zero())),
        }
    }

    // ========================================================================
    // Singleton getters/setters
    // ========================================================================

    pub fn get_latest_products(&self) -> Option<Vec<ProductRecord>> {
        rw_read(&self.latest_products, SOURCE, "get_latest_products").clone()
    }

    pub fn set_latest_products(&self, value: Vec<ProductRecord>) {
        *rw_write(&self.latest_products, SOURCE, "set_latest_products") = Some(value);
    }

    pub fn invalidate_latest_products(&self) {
        *rw_write(&self.latest_products, SOURCE, "invalidate_latest_products") = None;
    }

    pub fn get_categories(&self) -> Option<Vec<String>> {
        rw_read(&self.categories, SOURCE, "get_categories").clone()
    }

    pub fn set_categories(&self, value: Vec<String>) {
        *rw_write(&self.categories, SOURCE, "set_categories") = Some(value);
    }

    pub fn invalidate_categories(&self) {
        *rw_write(&self.categories, SOURCE, "invalidate_categories") = None;
    }

    pub fn get_admin_products(&self) -> Option<Vec<ProductRecord>> {
        rw_read(&self.admin_products, SOURCE, "get_admin_products").clone()
    }

    pub fn set_admin_products(&self, value: Vec<ProductRecord>) {
        *rw_write(&self.admin_products, SOURCE, "set_admin_products") = Some(value);
    }

    pub fn invalidate_admin_products(&self) {
        *rw_write(&self.admin_products, SOURCE, "invalidate_admin_products") = None;
    }

    pub fn get_all_orders(&self) -> Option<Vec<OrderRecord>> {
        rw_read(&self.all_orders, SOURCE, "get_all_orders").clone()
    }

    pub fn set_all_orders(&self, value: Vec<OrderRecord>) {
        *rw_write(&self.all_orders, SOURCE, "set_all_orders") = Some(value);
    }

    pub fn invalidate_all_orders(&self) {
        *rw_write(&self.all_orders, SOURCE, "invalidate_all_orders") = None;
    }

    pub fn get_dashboard_overview(&self) -> Option<DashboardOverview> {
        rw_read(&self.dashboard_overview, SOURCE, "get_dashboard_overview").clone()
    }

    pub fn set_dashboard_overview(&self, value: DashboardOverview) {
        *rw_write(&self.dashboard_overview, SOURCE, "set_dashboard_overview") = Some(value);
    }

    pub fn invalidate_dashboard_overview(&self) {
        *rw_write(
            &self.dashboard_overview,
            SOURCE,
            "invalidate_dashboard_overview",
        ) = None;
    }

    pub fn get_pie_charts(&self) -> Option<PieCharts> {
        rw_read(&self.pie_charts, SOURCE, "get_pie_charts").clone()
    }

    pub fn set_pie_charts(&self, value: PieCharts) {
        *rw_write(&self.pie_charts, SOURCE, "set_pie_charts") = Some(value);
    }

    pub fn invalidate_pie_charts(&self) {
        *rw_write(&self.pie_charts, SOURCE, "invalidate_pie_charts") = None;
    }

    pub fn get_bar_charts(&self) -> Option<BarCharts> {
        rw_read(&self.bar_charts, SOURCE, "get_bar_charts").clone()
    }

    pub fn set_bar_charts(&self, value: BarCharts) {
        *rw_write(&self.bar_charts, SOURCE, "set_bar_charts") = Some(value);
    }

    pub fn invalidate_bar_charts(&self) {
        *rw_write(&self.bar_charts, SOURCE, "invalidate_bar_charts") = None;
    }

    // ========================================================================
    // Product KV cache
    // ========================================================================

    pub fn get_product(&self, id: Uuid) -> Option<ProductRecord> {
        rw_write(&self.products_by_id, SOURCE, "get_product")
            .get(&id)
            .cloned()
    }

    pub fn set_product(&self, product: ProductRecord) {
        rw_write(&self.products_by_id, SOURCE, "set_product").put(product.id, product);
    }

    pub fn invalidate_product(&self, id: Uuid) {
        rw_write(&self.products_by_id, SOURCE, "invalidate_product").pop(&id);
    }

    // ========================================================================
    // Order KV caches
    // ========================================================================

    pub fn get_order(&self, id: Uuid) -> Option<OrderRecord> {
        rw_write(&self.orders_by_id, SOURCE, "get_order")
            .get(&id)
            .cloned()
    }

    pub fn set_order(&self, order: OrderRecord) {
        rw_write(&self.orders_by_id, SOURCE, "set_order").put(order.id, order);
    }

    pub fn invalidate_order(&self, id: Uuid) {
        rw_write(&self.orders_by_id, SOURCE, "invalidate_order").pop(&id);
    }

    pub fn get_user_orders(&self, user_id: Uuid) -> Option<Vec<OrderRecord>> {
        rw_write(&self.orders_by_user, SOURCE, "get_user_orders")
            .get(&user_id)
            .cloned()
    }

    pub fn set_user_orders(&self, user_id: Uuid, orders: Vec<OrderRecord>) {
        rw_write(&self.orders_by_user, SOURCE, "set_user_orders").put(user_id, orders);
    }

    pub fn invalidate_user_orders(&self, user_id: Uuid) {
        rw_write(&self.orders_by_user, SOURCE, "invalidate_user_orders").pop(&user_id);
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Drop the view named by `key`. Absent entries are ignored.
    pub fn purge(&self, key: &ViewKey) {
        match key {
            ViewKey::LatestProducts => self.invalidate_latest_products(),
            ViewKey::Categories => self.invalidate_categories(),
            ViewKey::AdminProducts => self.invalidate_admin_products(),
            ViewKey::Product(id) => self.invalidate_product(*id),
            ViewKey::AllOrders => self.invalidate_all_orders(),
            ViewKey::UserOrders(user_id) => self.invalidate_user_orders(*user_id),
            ViewKey::Order(id) => self.invalidate_order(*id),
            ViewKey::DashboardOverview => self.invalidate_dashboard_overview(),
            ViewKey::PieCharts => self.invalidate_pie_charts(),
            ViewKey::BarCharts => self.invalidate_bar_charts(),
        }
    }

    /// Whether the view named by `key` currently holds a value.
    pub fn holds(&self, key: &ViewKey) -> bool {
        match key {
            ViewKey::LatestProducts => self.get_latest_products().is_some(),
            ViewKey::Categories => self.get_categories().is_some(),
            ViewKey::AdminProducts => self.get_admin_products().is_some(),
            ViewKey::Product(id) => self.get_product(*id).is_some(),
            ViewKey::AllOrders => self.get_all_orders().is_some(),
            ViewKey::UserOrders(user_id) => self.get_user_orders(*user_id).is_some(),
            ViewKey::Order(id) => self.get_order(*id).is_some(),
            ViewKey::DashboardOverview => self.get_dashboard_overview().is_some(),
            ViewKey::PieCharts => self.get_pie_charts().is_some(),
            ViewKey::BarCharts => self.get_bar_charts().is_some(),
        }
    }

    /// Clear all cached data.
    pub fn clear(&self) {
        self.invalidate_latest_products();
        self.invalidate_categories();
        self.invalidate_admin_products();
        self.invalidate_all_orders();
        self.invalidate_dashboard_overview();
        self.invalidate_pie_charts();
        self.invalidate_bar_charts();
        rw_write(&self.products_by_id, SOURCE, "clear.products_by_id").clear();
        rw_write(&self.orders_by_id, SOURCE, "clear.orders_by_id").clear();
        rw_write(&self.orders_by_user, SOURCE, "clear.orders_by_user").clear();
    }
}
