//! Pie- and bar-chart aggregation.

use std::sync::Arc;

use time::{Date, OffsetDateTime};

use crate::application::error::AppError;
use crate::application::repos::{OrderFinanceTotals, OrdersRepo, ProductsRepo, UsersRepo};
use crate::domain::analytics::{TrailingWindow, age_years};
use crate::domain::types::{OrderStatus, UserRole};

use super::overview::category_shares;
use super::types::{
    AgeGroups, BarCharts, OrderFulfilment, PieCharts, RevenueDistribution, RoleSplit,
    StockAvailability,
};

/// Share of gross income attributed to marketing spend.
const MARKETING_RATE: f64 = 0.30;

const SHORT_SERIES_MONTHS: u32 = 6;
const LONG_SERIES_MONTHS: u32 = 12;

pub(super) async fn compute_pie(
    products: &Arc<dyn ProductsRepo>,
    orders: &Arc<dyn OrdersRepo>,
    users: &Arc<dyn UsersRepo>,
    now: OffsetDateTime,
) -> Result<PieCharts, AppError> {
    let (
        processing,
        shipped,
        delivered,
        category_counts,
        total_products,
        out_of_stock,
        finance,
        birth_dates,
        customers,
        admins,
    ) = tokio::try_join!(
        orders.count_by_status(OrderStatus::Processing),
        orders.count_by_status(OrderStatus::Shipped),
        orders.count_by_status(OrderStatus::Delivered),
        products.category_counts(),
        products.count_products(),
        products.count_out_of_stock(),
        orders.finance_totals(),
        users.list_birth_dates(),
        users.count_by_role(UserRole::Customer),
        users.count_by_role(UserRole::Admin),
    )?;

    Ok(PieCharts {
        fulfilment: OrderFulfilment {
            processing,
            shipped,
            delivered,
        },
        category_shares: category_shares(&category_counts, total_products),
        stock: StockAvailability {
            in_stock: total_products.saturating_sub(out_of_stock),
            out_of_stock,
        },
        revenue: revenue_distribution(finance),
        age_groups: age_groups(&birth_dates, now.date()),
        roles: RoleSplit { admins, customers },
    })
}

pub(super) async fn compute_bar(
    products: &Arc<dyn ProductsRepo>,
    orders: &Arc<dyn OrdersRepo>,
    users: &Arc<dyn UsersRepo>,
    now: OffsetDateTime,
) -> Result<BarCharts, AppError> {
    let short_window = TrailingWindow::new(SHORT_SERIES_MONTHS, now);
    let long_window = TrailingWindow::new(LONG_SERIES_MONTHS, now);

    let (product_stamps, user_stamps, order_pulses) = tokio::try_join!(
        products.list_created_since(short_window.start()),
        users.list_created_since(short_window.start()),
        orders.list_pulses_since(long_window.start()),
    )?;

    Ok(BarCharts {
        products: short_window.counts(product_stamps),
        users: short_window.counts(user_stamps),
        orders: long_window.counts(order_pulses.iter().map(|pulse| pulse.created_at)),
    })
}

/// Decompose gross income into margin, discount, shipping ("production"),
/// tax ("burnt"), and an imputed marketing spend.
pub(super) fn revenue_distribution(totals: OrderFinanceTotals) -> RevenueDistribution {
    let marketing_cost = (totals.gross_income as f64 * MARKETING_RATE).round() as i64;
    let net_margin = totals.gross_income
        - totals.discount
        - totals.shipping_charges
        - totals.tax
        - marketing_cost;

    RevenueDistribution {
        net_margin,
        discount: totals.discount,
        production_cost: totals.shipping_charges,
        burnt: totals.tax,
        marketing_cost,
    }
}

pub(super) fn age_groups(birth_dates: &[Date], on: Date) -> AgeGroups {
    let mut groups = AgeGroups {
        teen: 0,
        adult: 0,
        senior: 0,
    };
    for born in birth_dates {
        let age = age_years(*born, on);
        if age < 20 {
            groups.teen += 1;
        } else if age < 40 {
            groups.adult += 1;
        } else {
            groups.senior += 1;
        }
    }
    groups
}
