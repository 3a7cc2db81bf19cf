//! Mutation event system.
//!
//! Write paths publish events describing what changed; the consumer turns
//! pending events into an invalidation plan.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::gauge;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";
const METRIC_EVENT_QUEUE_LEN: &str = "bottega_cache_event_queue_len";

/// Monotonic epoch for ordering events.
///
/// Each event gets a unique, monotonically increasing epoch number within
/// this process.
pub type Epoch = u64;

/// Mutation event with idempotency and ordering support.
#[derive(Debug, Clone)]
pub struct MutationEvent {
    /// Unique identifier for idempotency (UUIDv4).
    pub id: Uuid,
    /// Monotonic epoch for ordering within this process.
    pub epoch: Epoch,
    /// The semantic scope of the mutation.
    pub kind: MutationKind,
    /// When the event was created.
    pub timestamp: OffsetDateTime,
}

impl MutationEvent {
    /// Create a new mutation event with the given kind and epoch.
    pub fn new(kind: MutationKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Semantic scope of a store mutation.
///
/// Kinds are independent and combinable: one write may publish several in a
/// single batch (placing an order dirties catalog, order, and dashboard
/// views at once, because stock moved, a new order exists, and the totals
/// changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// One or more products were created, updated, or deleted.
    ProductsChanged { ids: Vec<Uuid> },
    /// An order was created, updated, or deleted. Identifiers may be absent
    /// when the triggering site does not know them; absent identifiers skip
    /// the corresponding scoped view rather than purging a placeholder.
    OrderChanged {
        order_id: Option<Uuid>,
        user_id: Option<Uuid>,
    },
    /// Dashboard aggregates are stale.
    AdminViewsDirty,
}

/// In-memory event queue for cache invalidation.
///
/// Events are published by write operations and consumed by the cache
/// consumer. The queue uses a mutex for simplicity since contention is
/// expected to be low.
pub struct EventQueue {
    queue: Mutex<VecDeque<MutationEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    /// Get the next epoch number.
    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Publish an event to the queue.
    ///
    /// The event is logged for observability.
    pub fn publish(&self, kind: MutationKind) {
        let epoch = self.next_epoch();
        let event = MutationEvent::new(kind.clone(), epoch);

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?kind,
            "Mutation event enqueued"
        );

        let mut queue = mutex_lock(&self.queue, SOURCE, "publish");
        queue.push_back(event);
        gauge!(METRIC_EVENT_QUEUE_LEN).set(queue.len() as f64);
    }

    /// Drain up to `limit` events from the queue.
    ///
    /// Returns the events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<MutationEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        let events: Vec<_> = queue.drain(..count).collect();
        gauge!(METRIC_EVENT_QUEUE_LEN).set(queue.len() as f64);
        events
    }

    /// Get the current queue length.
    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all events from the queue.
    pub fn clear(&self) {
        mutex_lock(&self.queue, SOURCE, "clear").clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
