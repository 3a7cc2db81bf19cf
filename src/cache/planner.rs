//! Invalidation plan generation.
//!
//! Folds a batch of mutation events into the exact set of view keys to
//! purge. The fan-out is deliberately coarse per mutation kind: it trades a
//! little over-invalidation for the guarantee that no stale catalog or
//! dashboard view survives a relevant write, while leaving unrelated views
//! untouched.

use std::collections::HashSet;
use std::fmt;

use super::events::{MutationEvent, MutationKind};
use super::keys::ViewKey;

/// The set of derived views a batch of mutations made stale.
#[derive(Debug, Default)]
pub struct InvalidationPlan {
    purge: HashSet<ViewKey>,
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidationPlan {{ purge: {} }}", self.purge.len())
    }
}

impl InvalidationPlan {
    /// Merge multiple events into a deduplicated plan.
    ///
    /// Events are deduplicated by id; kinds are independent, so their key
    /// sets union. The mapping per kind:
    ///
    /// - `ProductsChanged` purges the latest-product, category, and admin
    ///   listings plus every named per-product view;
    /// - `OrderChanged` purges the all-orders listing plus the per-order and
    ///   per-user views whose identifiers are known (an absent identifier
    ///   skips its scoped view);
    /// - `AdminViewsDirty` purges the three dashboard payloads.
    pub fn from_events(events: Vec<MutationEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen_ids = HashSet::new();

        for event in events {
            if !seen_ids.insert(event.id) {
                continue;
            }

            match event.kind {
                MutationKind::ProductsChanged { ids } => {
                    plan.purge.insert(ViewKey::LatestProducts);
                    plan.purge.insert(ViewKey::Categories);
                    plan.purge.insert(ViewKey::AdminProducts);
                    for id in ids {
                        plan.purge.insert(ViewKey::Product(id));
                    }
                }
                MutationKind::OrderChanged { order_id, user_id } => {
                    plan.purge.insert(ViewKey::AllOrders);
                    if let Some(user_id) = user_id {
                        plan.purge.insert(ViewKey::UserOrders(user_id));
                    }
                    if let Some(order_id) = order_id {
                        plan.purge.insert(ViewKey::Order(order_id));
                    }
                }
                MutationKind::AdminViewsDirty => {
                    plan.purge.insert(ViewKey::DashboardOverview);
                    plan.purge.insert(ViewKey::PieCharts);
                    plan.purge.insert(ViewKey::BarCharts);
                }
            }
        }

        plan
    }

    /// Keys to purge, in no particular order.
    pub fn purge_keys(&self) -> impl Iterator<Item = &ViewKey> {
        self.purge.iter()
    }

    pub fn contains(&self, key: &ViewKey) -> bool {
        self.purge.contains(key)
    }

    pub fn len(&self) -> usize {
        self.purge.len()
    }

    /// Check if the plan has any actions to execute.
    pub fn is_empty(&self) -> bool {
        self.purge.is_empty()
    }
}
