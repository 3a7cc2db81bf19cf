//! Dashboard payload shapes.
//!
//! Fully reconstructible from the store at any time; cached verbatim until
//! an invalidation drops them.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::types::OrderStatus;

/// Month-over-month deltas, as rounded percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangePercent {
    pub revenue: i64,
    pub products: i64,
    pub users: i64,
    pub orders: i64,
}

/// Lifetime totals across the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifetimeCounts {
    pub revenue: i64,
    pub products: u64,
    pub users: u64,
    pub orders: u64,
}

/// Trailing six months of order activity, oldest bucket first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyOrderSeries {
    pub orders: Vec<u64>,
    pub revenue: Vec<i64>,
}

/// One category's share of the total product count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub share_percent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenderRatio {
    pub female: u64,
    pub male: u64,
}

/// A recent order reduced to what the dashboard table shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrder {
    pub id: Uuid,
    pub discount: i64,
    pub amount: i64,
    pub item_count: usize,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub change: ChangePercent,
    pub counts: LifetimeCounts,
    pub chart: MonthlyOrderSeries,
    pub category_shares: Vec<CategoryShare>,
    pub gender_ratio: GenderRatio,
    pub latest_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderFulfilment {
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockAvailability {
    pub in_stock: u64,
    pub out_of_stock: u64,
}

/// Gross income broken down into where it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueDistribution {
    pub net_margin: i64,
    pub discount: i64,
    pub production_cost: i64,
    pub burnt: i64,
    pub marketing_cost: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeGroups {
    pub teen: u64,
    pub adult: u64,
    pub senior: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleSplit {
    pub admins: u64,
    pub customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieCharts {
    pub fulfilment: OrderFulfilment,
    pub category_shares: Vec<CategoryShare>,
    pub stock: StockAvailability,
    pub revenue: RevenueDistribution,
    pub age_groups: AgeGroups,
    pub roles: RoleSplit,
}

/// Trailing creation counts, oldest bucket first: six months of products
/// and signups, twelve months of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarCharts {
    pub products: Vec<u64>,
    pub users: Vec<u64>,
    pub orders: Vec<u64>,
}
