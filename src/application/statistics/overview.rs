//! Dashboard overview aggregation.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::application::error::AppError;
use crate::application::orders::RECENT_ORDER_LIMIT;
use crate::application::repos::{CategoryCount, OrdersRepo, ProductsRepo, UsersRepo};
use crate::domain::analytics::{MonthWindow, TrailingWindow, change_percent, share_percent};
use crate::domain::entities::OrderRecord;
use crate::domain::types::Gender;

use super::types::{
    CategoryShare, ChangePercent, DashboardOverview, GenderRatio, LifetimeCounts,
    MonthlyOrderSeries, RecentOrder,
};

const SERIES_MONTHS: u32 = 6;

pub(super) async fn compute(
    products: &Arc<dyn ProductsRepo>,
    orders: &Arc<dyn OrdersRepo>,
    users: &Arc<dyn UsersRepo>,
    now: OffsetDateTime,
) -> Result<DashboardOverview, AppError> {
    let this_month = MonthWindow::current(now);
    let last_month = MonthWindow::previous(now);
    let series_window = TrailingWindow::new(SERIES_MONTHS, now);

    let (
        products_this_month,
        products_last_month,
        users_this_month,
        users_last_month,
        orders_this_month,
        orders_last_month,
        total_products,
        total_users,
        total_orders,
        lifetime_revenue,
        series_pulses,
        category_counts,
        female_users,
        recent_orders,
    ) = tokio::try_join!(
        products.count_created_between(this_month),
        products.count_created_between(last_month),
        users.count_created_between(this_month),
        users.count_created_between(last_month),
        orders.list_pulses_between(this_month),
        orders.list_pulses_between(last_month),
        products.count_products(),
        users.count_users(),
        orders.count_orders(),
        orders.lifetime_revenue(),
        orders.list_pulses_since(series_window.start()),
        products.category_counts(),
        users.count_by_gender(Gender::Female),
        orders.list_recent(RECENT_ORDER_LIMIT),
    )?;

    let revenue_this_month: i64 = orders_this_month.iter().map(|pulse| pulse.total).sum();
    let revenue_last_month: i64 = orders_last_month.iter().map(|pulse| pulse.total).sum();

    let change = ChangePercent {
        revenue: change_percent(revenue_this_month, revenue_last_month),
        products: change_percent(products_this_month as i64, products_last_month as i64),
        users: change_percent(users_this_month as i64, users_last_month as i64),
        orders: change_percent(
            orders_this_month.len() as i64,
            orders_last_month.len() as i64,
        ),
    };

    let counts = LifetimeCounts {
        revenue: lifetime_revenue,
        products: total_products,
        users: total_users,
        orders: total_orders,
    };

    let mut order_counts = vec![0_u64; SERIES_MONTHS as usize];
    let mut revenue_series = vec![0_i64; SERIES_MONTHS as usize];
    for pulse in &series_pulses {
        if let Some(index) = series_window.bucket_index(pulse.created_at) {
            order_counts[index] += 1;
            revenue_series[index] += pulse.total;
        }
    }

    Ok(DashboardOverview {
        change,
        counts,
        chart: MonthlyOrderSeries {
            orders: order_counts,
            revenue: revenue_series,
        },
        category_shares: category_shares(&category_counts, total_products),
        gender_ratio: GenderRatio {
            female: female_users,
            male: total_users.saturating_sub(female_users),
        },
        latest_orders: recent_orders.iter().map(recent_order).collect(),
    })
}

pub(super) fn category_shares(counts: &[CategoryCount], total: u64) -> Vec<CategoryShare> {
    counts
        .iter()
        .map(|entry| CategoryShare {
            category: entry.category.clone(),
            share_percent: share_percent(entry.count, total),
        })
        .collect()
}

fn recent_order(order: &OrderRecord) -> RecentOrder {
    RecentOrder {
        id: order.id,
        discount: order.discount,
        amount: order.total,
        item_count: order.items.len(),
        status: order.status,
    }
}
