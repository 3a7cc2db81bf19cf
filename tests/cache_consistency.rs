//! End-to-end cache consistency over the service layer.
//!
//! Exercises the read-through accessors and the invalidation fan-out
//! against an in-memory record store, including the literal over-ordering
//! behavior (stock may go negative; placement does not clamp it).

mod common;

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use bottega::application::catalog::CatalogService;
use bottega::application::error::AppError;
use bottega::application::orders::{OrderLine, OrderService, PricingRules};
use bottega::application::statistics::StatisticsService;
use bottega::cache::{
    CacheConfig, CacheConsumer, CacheTrigger, EventQueue, MutationKind, ViewKey, ViewStore,
};
use bottega::domain::types::OrderStatus;

use common::{MemoryStore, order_at, product_at};

struct Harness {
    store: Arc<MemoryStore>,
    views: Arc<ViewStore>,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
    trigger: Arc<CacheTrigger>,
    catalog: CatalogService,
    orders: OrderService,
    statistics: StatisticsService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let config = CacheConfig::default();
    let views = Arc::new(ViewStore::new(&config));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(
        config.clone(),
        Arc::clone(&views),
        Arc::clone(&queue),
    ));
    let trigger = Arc::new(CacheTrigger::new(
        config,
        Arc::clone(&queue),
        Arc::clone(&consumer),
    ));

    let catalog = CatalogService::new(
        store.clone(),
        store.clone(),
        Arc::clone(&views),
        Arc::clone(&trigger),
    );
    let orders = OrderService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::clone(&views),
        Arc::clone(&trigger),
        PricingRules::default(),
    );
    let statistics = StatisticsService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::clone(&views),
    );

    Harness {
        store,
        views,
        queue,
        consumer,
        trigger,
        catalog,
        orders,
        statistics,
    }
}

#[tokio::test]
async fn latest_products_read_through_queries_store_once() {
    let h = harness();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(Uuid::new_v4(), "mugs", 450, 10, now));
    h.store
        .push_product(product_at(Uuid::new_v4(), "plates", 300, 5, now));

    assert_eq!(h.store.read_query_count(), 0);

    let first = h.catalog.latest_products().await.expect("first read");
    assert_eq!(first.len(), 2);
    assert_eq!(h.store.read_query_count(), 1);
    assert!(h.views.holds(&ViewKey::LatestProducts));

    let second = h.catalog.latest_products().await.expect("second read");
    assert_eq!(second, first);
    // Store was NOT queried again.
    assert_eq!(h.store.read_query_count(), 1);
}

#[tokio::test]
async fn product_fan_out_purges_catalog_views_and_spares_orders() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();

    h.views.set_latest_products(vec![]);
    h.views.set_categories(vec!["mugs".to_string()]);
    h.views.set_admin_products(vec![]);
    h.views
        .set_product(product_at(product_id, "mugs", 450, 10, now));
    h.views
        .set_order(order_at(order_id, Uuid::new_v4(), 100, OrderStatus::Processing, now));

    h.queue.publish(MutationKind::ProductsChanged {
        ids: vec![product_id],
    });
    h.consumer.consume().await;

    assert!(!h.views.holds(&ViewKey::LatestProducts));
    assert!(!h.views.holds(&ViewKey::Categories));
    assert!(!h.views.holds(&ViewKey::AdminProducts));
    assert!(!h.views.holds(&ViewKey::Product(product_id)));
    // Unrelated order view survives.
    assert!(h.views.holds(&ViewKey::Order(order_id)));
}

#[tokio::test]
async fn fan_out_is_idempotent() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();

    h.views
        .set_order(order_at(order_id, Uuid::new_v4(), 100, OrderStatus::Processing, now));

    h.trigger.product_saved(product_id).await;
    let after_first: Vec<bool> = observed_keys(product_id, order_id)
        .iter()
        .map(|key| h.views.holds(key))
        .collect();

    h.trigger.product_saved(product_id).await;
    let after_second: Vec<bool> = observed_keys(product_id, order_id)
        .iter()
        .map(|key| h.views.holds(key))
        .collect();

    assert_eq!(after_first, after_second);
}

fn observed_keys(product_id: Uuid, order_id: Uuid) -> Vec<ViewKey> {
    vec![
        ViewKey::LatestProducts,
        ViewKey::Categories,
        ViewKey::AdminProducts,
        ViewKey::Product(product_id),
        ViewKey::AllOrders,
        ViewKey::Order(order_id),
        ViewKey::DashboardOverview,
        ViewKey::PieCharts,
        ViewKey::BarCharts,
    ]
}

#[tokio::test]
async fn invalidated_product_is_recomputed_from_store() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 10, now));

    h.catalog.product(product_id).await.expect("first read");
    assert!(h.views.holds(&ViewKey::Product(product_id)));
    let reads_after_populate = h.store.read_query_count();

    h.trigger.product_saved(product_id).await;
    assert!(!h.views.holds(&ViewKey::Product(product_id)));

    h.catalog.product(product_id).await.expect("re-read");
    assert_eq!(h.store.read_query_count(), reads_after_populate + 1);
}

#[tokio::test]
async fn order_placement_decrements_stock_and_totals_add_up() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 5, now));

    let order = h
        .orders
        .place_order(
            user_id,
            vec![OrderLine {
                product_id,
                quantity: 2,
            }],
            0,
        )
        .await
        .expect("placement succeeds");

    assert_eq!(h.store.product_stock(product_id), Some(3));
    assert_eq!(order.subtotal, 900);
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(
        order.total,
        order.subtotal + order.tax + order.shipping_charges - order.discount
    );
}

#[tokio::test]
async fn over_ordering_drives_stock_negative() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 3, now));

    h.orders
        .place_order(
            Uuid::new_v4(),
            vec![OrderLine {
                product_id,
                quantity: 10,
            }],
            0,
        )
        .await
        .expect("over-ordering is not blocked");

    // The literal resulting value: no clamp at zero.
    assert_eq!(h.store.product_stock(product_id), Some(-7));
}

#[tokio::test]
async fn order_placement_purges_catalog_order_and_dashboard_views() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 5, now));

    // Prime one view from each group.
    h.catalog.latest_products().await.expect("prime catalog");
    h.orders.all_orders().await.expect("prime orders");
    h.statistics.overview(now).await.expect("prime dashboard");
    assert!(h.views.holds(&ViewKey::LatestProducts));
    assert!(h.views.holds(&ViewKey::AllOrders));
    assert!(h.views.holds(&ViewKey::DashboardOverview));

    let order = h
        .orders
        .place_order(
            user_id,
            vec![OrderLine {
                product_id,
                quantity: 1,
            }],
            0,
        )
        .await
        .expect("placement succeeds");

    assert!(!h.views.holds(&ViewKey::LatestProducts));
    assert!(!h.views.holds(&ViewKey::AllOrders));
    assert!(!h.views.holds(&ViewKey::DashboardOverview));
    assert!(!h.views.holds(&ViewKey::Product(product_id)));
    assert!(!h.views.holds(&ViewKey::UserOrders(user_id)));
    assert!(!h.views.holds(&ViewKey::Order(order.id)));
}

#[tokio::test]
async fn failed_placement_leaves_store_and_cache_untouched() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 5, now));
    h.catalog.latest_products().await.expect("prime catalog");

    let result = h
        .orders
        .place_order(
            Uuid::new_v4(),
            vec![
                OrderLine {
                    product_id,
                    quantity: 1,
                },
                OrderLine {
                    product_id: Uuid::new_v4(), // unknown
                    quantity: 1,
                },
            ],
            0,
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    // No order written, no stock moved, no view purged.
    assert_eq!(h.store.orders.lock().unwrap().len(), 0);
    assert_eq!(h.store.product_stock(product_id), Some(5));
    assert!(h.views.holds(&ViewKey::LatestProducts));
}

#[tokio::test]
async fn my_orders_read_through_and_invalidation() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 10, now));

    h.orders
        .place_order(
            user_id,
            vec![OrderLine {
                product_id,
                quantity: 1,
            }],
            0,
        )
        .await
        .expect("placement succeeds");

    let mine = h.orders.my_orders(user_id).await.expect("first read");
    assert_eq!(mine.len(), 1);
    assert!(h.views.holds(&ViewKey::UserOrders(user_id)));

    let reads = h.store.read_query_count();
    let again = h.orders.my_orders(user_id).await.expect("cached read");
    assert_eq!(again, mine);
    assert_eq!(h.store.read_query_count(), reads);
}

#[tokio::test]
async fn advancing_an_order_purges_its_views() {
    let h = harness();
    let product_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();
    h.store
        .push_product(product_at(product_id, "mugs", 450, 10, now));

    let order = h
        .orders
        .place_order(
            user_id,
            vec![OrderLine {
                product_id,
                quantity: 1,
            }],
            0,
        )
        .await
        .expect("placement succeeds");

    h.orders.order(order.id).await.expect("prime order view");
    h.orders.my_orders(user_id).await.expect("prime user view");

    let advanced = h.orders.advance_order(order.id).await.expect("advance");
    assert_eq!(advanced.status, OrderStatus::Shipped);
    assert!(!h.views.holds(&ViewKey::Order(order.id)));
    assert!(!h.views.holds(&ViewKey::UserOrders(user_id)));

    let reloaded = h.orders.order(order.id).await.expect("re-read");
    assert_eq!(reloaded.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn missing_order_is_not_found_and_not_cached() {
    let h = harness();
    let missing = Uuid::new_v4();

    let result = h.orders.order(missing).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert!(!h.views.holds(&ViewKey::Order(missing)));
}
