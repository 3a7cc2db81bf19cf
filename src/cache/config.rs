//! Cache configuration.
//!
//! Controls the derived-view cache via `bottega.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_PRODUCT_LIMIT: usize = 500;
const DEFAULT_ORDER_LIMIT: usize = 500;
const DEFAULT_USER_ORDER_LIST_LIMIT: usize = 200;
const DEFAULT_AUTO_CONSUME_INTERVAL_MS: u64 = 5000;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

/// Cache configuration from `bottega.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the derived-view cache. When off, triggers become no-ops and
    /// every read recomputes from the store.
    pub enabled: bool,
    /// Maximum products in the per-id KV cache.
    pub product_limit: usize,
    /// Maximum orders in the per-id KV cache.
    pub order_limit: usize,
    /// Maximum per-user order lists in the KV cache.
    pub user_order_list_limit: usize,
    /// Auto-consume interval (ms) for eventual consistency.
    pub auto_consume_interval_ms: u64,
    /// Maximum events per consumption batch.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            product_limit: DEFAULT_PRODUCT_LIMIT,
            order_limit: DEFAULT_ORDER_LIMIT,
            user_order_list_limit: DEFAULT_USER_ORDER_LIST_LIMIT,
            auto_consume_interval_ms: DEFAULT_AUTO_CONSUME_INTERVAL_MS,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            product_limit: settings.product_limit,
            order_limit: settings.order_limit,
            user_order_list_limit: settings.user_order_list_limit,
            auto_consume_interval_ms: settings.auto_consume_interval_ms,
            consume_batch_limit: settings.consume_batch_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the product KV limit as NonZeroUsize, clamping to 1 if zero.
    pub fn product_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.product_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the order KV limit as NonZeroUsize, clamping to 1 if zero.
    pub fn order_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.order_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the user order-list limit as NonZeroUsize, clamping to 1 if zero.
    pub fn user_order_list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.user_order_list_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
