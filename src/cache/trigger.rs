//! Cache trigger service.
//!
//! High-level API for publishing mutation events after a successful store
//! write, and consuming them immediately so the staleness window stays
//! bounded by the write-to-fan-out gap.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::consumer::CacheConsumer;
use super::events::{EventQueue, MutationKind};

/// Cache trigger for publishing mutation events.
///
/// Wraps the event queue and consumer, providing convenience methods for
/// the write paths.
///
/// # Usage
///
/// ```ignore
/// // After a successful product update:
/// trigger.product_saved(product.id).await;
/// ```
pub struct CacheTrigger {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publish a batch of kinds and optionally consume immediately.
    ///
    /// Kinds are independent; one write may dirty several scopes at once.
    /// If `consume_now` is false, events wait for the auto-consume timer or
    /// the next explicit consumption.
    pub async fn trigger(&self, kinds: Vec<MutationKind>, consume_now: bool) {
        if !self.config.enabled {
            debug!(?kinds, "Cache trigger skipped: cache disabled");
            return;
        }

        for kind in kinds {
            self.queue.publish(kind);
        }

        if consume_now {
            self.consumer.consume().await;
        }
    }

    /// A product was created, updated, or deleted.
    pub async fn product_saved(&self, product_id: Uuid) {
        self.trigger(
            vec![
                MutationKind::ProductsChanged {
                    ids: vec![product_id],
                },
                MutationKind::AdminViewsDirty,
            ],
            true,
        )
        .await;
    }

    /// Several products changed in one write (bulk import, stock sweep).
    pub async fn products_changed(&self, ids: Vec<Uuid>) {
        self.trigger(
            vec![
                MutationKind::ProductsChanged { ids },
                MutationKind::AdminViewsDirty,
            ],
            true,
        )
        .await;
    }

    /// An order was placed: stock moved, a new order exists, and the
    /// dashboard totals are stale.
    pub async fn order_placed(&self, order_id: Uuid, user_id: Uuid, product_ids: Vec<Uuid>) {
        self.trigger(
            vec![
                MutationKind::ProductsChanged { ids: product_ids },
                MutationKind::OrderChanged {
                    order_id: Some(order_id),
                    user_id: Some(user_id),
                },
                MutationKind::AdminViewsDirty,
            ],
            true,
        )
        .await;
    }

    /// An order's status changed or it was deleted.
    pub async fn order_updated(&self, order_id: Uuid, user_id: Uuid) {
        self.trigger(
            vec![
                MutationKind::OrderChanged {
                    order_id: Some(order_id),
                    user_id: Some(user_id),
                },
                MutationKind::AdminViewsDirty,
            ],
            true,
        )
        .await;
    }

    /// Dashboard aggregates are stale for a reason outside the catalog and
    /// order scopes (user signup shifts demographics and counts).
    pub async fn admin_views_dirty(&self) {
        self.trigger(vec![MutationKind::AdminViewsDirty], true).await;
    }

    /// Get the underlying config.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the underlying event queue.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Get the underlying consumer.
    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}
