//! Cache consumer for executing invalidation plans.
//!
//! Drains pending mutation events, folds them into a plan, and purges the
//! affected views from the store.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{info, instrument};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::EventQueue;
use super::planner::InvalidationPlan;
use super::store::ViewStore;

const METRIC_CACHE_CONSUME_MS: &str = "bottega_cache_consume_ms";

/// Cache consumer that processes mutation events and purges stale views.
///
/// The consumer:
/// 1. Drains events from the queue (bounded batch)
/// 2. Generates an invalidation plan from the events
/// 3. Purges every planned key from the view store
pub struct CacheConsumer {
    config: CacheConfig,
    store: Arc<ViewStore>,
    queue: Arc<EventQueue>,
}

impl CacheConsumer {
    pub fn new(config: CacheConfig, store: Arc<ViewStore>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            store,
            queue,
        }
    }

    /// Consume pending events and purge the planned keys.
    ///
    /// Returns true if any events were processed. Purging is idempotent:
    /// consuming the same plan twice leaves the store in the same state,
    /// since removing an absent entry is a no-op.
    #[instrument(skip(self))]
    pub async fn consume(&self) -> bool {
        let consume_started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        if events.is_empty() {
            return false;
        }

        let event_count = events.len();
        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let plan = InvalidationPlan::from_events(events);

        info!(
            event_count,
            event_ids = ?event_ids,
            plan = %plan,
            "Cache consumption starting"
        );

        for key in plan.purge_keys() {
            self.store.purge(key);
        }

        info!(
            event_count,
            purged = plan.len(),
            "Cache consumption complete"
        );

        histogram!(METRIC_CACHE_CONSUME_MS)
            .record(consume_started_at.elapsed().as_secs_f64() * 1000.0);

        true
    }

    /// Get reference to the event queue.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Get reference to the view store.
    pub fn store(&self) -> &Arc<ViewStore> {
        &self.store
    }
}
