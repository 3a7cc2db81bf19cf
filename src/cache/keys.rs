//! Cache key definitions.
//!
//! [`ViewKey`] names every derived view the cache can hold. The namespace is
//! closed: each variant maps onto exactly one slot of the
//! [`ViewStore`](super::ViewStore).

use uuid::Uuid;

/// Identifies one cached derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    // Catalog views
    /// The five most recently created products.
    LatestProducts,
    /// Distinct, case-normalized category names.
    Categories,
    /// The unpaginated admin product listing.
    AdminProducts,
    /// A single product by id.
    Product(Uuid),

    // Order views
    /// The unpaginated admin order listing.
    AllOrders,
    /// One user's order history.
    UserOrders(Uuid),
    /// A single order by id.
    Order(Uuid),

    // Dashboard views
    /// Month-over-month deltas, lifetime counts, recent transactions.
    DashboardOverview,
    /// Fulfilment, stock, revenue, and demographic distributions.
    PieCharts,
    /// Trailing-month creation/signup/order series.
    BarCharts,
}
