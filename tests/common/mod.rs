//! In-memory repository fakes shared by the integration suites.

#![allow(dead_code)]

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use bottega::application::repos::{
    CategoryCount, CouponsRepo, CouponsWriteRepo, CreateCouponParams, CreateOrderParams,
    CreateProductParams, CreateUserParams, OrderFinanceTotals, OrderPulse, OrdersRepo,
    OrdersWriteRepo, PriceSort, ProductPage, ProductSearchFilter, ProductsRepo, ProductsWriteRepo,
    RepoError, UpdateProductParams, UsersRepo, UsersWriteRepo,
};
use bottega::domain::analytics::MonthWindow;
use bottega::domain::entities::{
    CouponRecord, OrderItemRecord, OrderRecord, ProductRecord, UserRecord,
};
use bottega::domain::types::{Gender, OrderStatus, UserRole};

/// A transparent in-memory record store.
///
/// Rows are plain vectors so tests can seed records with controlled
/// timestamps; `read_queries` counts every repository read so the suites
/// can assert when the cache short-circuits the store.
#[derive(Default)]
pub struct MemoryStore {
    pub products: Mutex<Vec<ProductRecord>>,
    pub orders: Mutex<Vec<OrderRecord>>,
    pub users: Mutex<Vec<UserRecord>>,
    pub coupons: Mutex<Vec<CouponRecord>>,
    pub read_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_query_count(&self) -> usize {
        self.read_queries.load(Ordering::SeqCst)
    }

    fn record_read(&self) {
        self.read_queries.fetch_add(1, Ordering::SeqCst);
    }

    pub fn push_product(&self, product: ProductRecord) {
        self.products.lock().unwrap().push(product);
    }

    pub fn push_order(&self, order: OrderRecord) {
        self.orders.lock().unwrap().push(order);
    }

    pub fn push_user(&self, user: UserRecord) {
        self.users.lock().unwrap().push(user);
    }

    pub fn product_stock(&self, id: Uuid) -> Option<i64> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.id == id)
            .map(|product| product.stock)
    }
}

pub fn product_at(id: Uuid, category: &str, price: i64, stock: i64, at: OffsetDateTime) -> ProductRecord {
    ProductRecord {
        id,
        name: format!("product-{category}"),
        price,
        stock,
        category: category.to_string(),
        created_at: at,
        updated_at: at,
    }
}

pub fn order_at(
    id: Uuid,
    user_id: Uuid,
    total: i64,
    status: OrderStatus,
    at: OffsetDateTime,
) -> OrderRecord {
    OrderRecord {
        id,
        user_id,
        items: vec![OrderItemRecord {
            product_id: Uuid::new_v4(),
            name: "item".to_string(),
            quantity: 1,
            price: total,
        }],
        subtotal: total,
        tax: 0,
        shipping_charges: 0,
        discount: 0,
        total,
        status,
        created_at: at,
        updated_at: at,
    }
}

pub fn user_at(
    id: Uuid,
    gender: Gender,
    role: UserRole,
    date_of_birth: Date,
    at: OffsetDateTime,
) -> UserRecord {
    UserRecord {
        id,
        name: "test-user".to_string(),
        email: format!("{id}@example.test"),
        gender,
        date_of_birth,
        role,
        created_at: at,
    }
}

#[async_trait]
impl ProductsRepo for MemoryStore {
    async fn list_latest(&self, limit: u32) -> Result<Vec<ProductRecord>, RepoError> {
        self.record_read();
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        self.record_read();
        Ok(self.products.lock().unwrap().clone())
    }

    async fn search(
        &self,
        filter: &ProductSearchFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ProductPage, RepoError> {
        self.record_read();
        let mut matching: Vec<ProductRecord> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| {
                filter
                    .search
                    .as_ref()
                    .is_none_or(|needle| {
                        product.name.to_lowercase().contains(&needle.to_lowercase())
                    })
                    && filter.max_price.is_none_or(|max| product.price <= max)
                    && filter
                        .category
                        .as_ref()
                        .is_none_or(|category| &product.category == category)
            })
            .cloned()
            .collect();

        match filter.sort {
            Some(PriceSort::Asc) => matching.sort_by_key(|product| product.price),
            Some(PriceSort::Desc) => matching.sort_by_key(|product| -product.price),
            None => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let per_page = per_page.max(1);
        let total_pages = (matching.len() as u64).div_ceil(u64::from(per_page));
        let start = ((page.max(1) - 1) * per_page) as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok(ProductPage { items, total_pages })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        self.record_read();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, RepoError> {
        self.record_read();
        let mut categories: Vec<String> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .map(|product| product.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn count_products(&self) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self.products.lock().unwrap().len() as u64)
    }

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| window.contains(product.created_at))
            .count() as u64)
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>, RepoError> {
        self.record_read();
        let mut counts: Vec<CategoryCount> = Vec::new();
        for product in self.products.lock().unwrap().iter() {
            match counts
                .iter_mut()
                .find(|entry| entry.category == product.category)
            {
                Some(entry) => entry.count += 1,
                None => counts.push(CategoryCount {
                    category: product.category.clone(),
                    count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(counts)
    }

    async fn count_out_of_stock(&self) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.stock <= 0)
            .count() as u64)
    }

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        self.record_read();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.created_at >= start)
            .map(|product| product.created_at)
            .collect())
    }
}

#[async_trait]
impl ProductsWriteRepo for MemoryStore {
    async fn create_product(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let product = ProductRecord {
            id: Uuid::new_v4(),
            name: params.name,
            price: params.price,
            stock: params.stock,
            category: params.category,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(RepoError::NotFound)?;

        if let Some(name) = params.name {
            product.name = name;
        }
        if let Some(price) = params.price {
            product.price = price;
        }
        if let Some(stock) = params.stock {
            product.stock = stock;
        }
        if let Some(category) = params.category {
            product.category = category;
        }
        product.updated_at = OffsetDateTime::now_utc();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|product| product.id != id);
        if products.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<(), RepoError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(RepoError::NotFound)?;
        product.stock += delta;
        product.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[async_trait]
impl OrdersRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderRecord>, RepoError> {
        self.record_read();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderRecord>, RepoError> {
        self.record_read();
        let mut orders: Vec<OrderRecord> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<OrderRecord>, RepoError> {
        self.record_read();
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<OrderRecord>, RepoError> {
        self.record_read();
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit as usize);
        Ok(orders)
    }

    async fn count_orders(&self) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self.orders.lock().unwrap().len() as u64)
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| order.status == status)
            .count() as u64)
    }

    async fn list_pulses_between(
        &self,
        window: MonthWindow,
    ) -> Result<Vec<OrderPulse>, RepoError> {
        self.record_read();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| window.contains(order.created_at))
            .map(|order| OrderPulse {
                total: order.total,
                created_at: order.created_at,
            })
            .collect())
    }

    async fn list_pulses_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OrderPulse>, RepoError> {
        self.record_read();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| order.created_at >= start)
            .map(|order| OrderPulse {
                total: order.total,
                created_at: order.created_at,
            })
            .collect())
    }

    async fn lifetime_revenue(&self) -> Result<i64, RepoError> {
        self.record_read();
        Ok(self.orders.lock().unwrap().iter().map(|order| order.total).sum())
    }

    async fn finance_totals(&self) -> Result<OrderFinanceTotals, RepoError> {
        self.record_read();
        let orders = self.orders.lock().unwrap();
        Ok(OrderFinanceTotals {
            gross_income: orders.iter().map(|order| order.total).sum(),
            discount: orders.iter().map(|order| order.discount).sum(),
            shipping_charges: orders.iter().map(|order| order.shipping_charges).sum(),
            tax: orders.iter().map(|order| order.tax).sum(),
        })
    }
}

#[async_trait]
impl OrdersWriteRepo for MemoryStore {
    async fn create_order(&self, params: CreateOrderParams) -> Result<OrderRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let order = OrderRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            items: params
                .items
                .into_iter()
                .map(|item| OrderItemRecord {
                    product_id: item.product_id,
                    name: item.name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            subtotal: params.subtotal,
            tax: params.tax,
            shipping_charges: params.shipping_charges,
            discount: params.discount,
            total: params.total,
            status: params.status,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, RepoError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepoError::NotFound)?;
        order.status = status;
        order.updated_at = OffsetDateTime::now_utc();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), RepoError> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|order| order.id != id);
        if orders.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn count_users(&self) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn count_created_between(&self, window: MonthWindow) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| window.contains(user.created_at))
            .count() as u64)
    }

    async fn count_by_gender(&self, gender: Gender) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.gender == gender)
            .count() as u64)
    }

    async fn count_by_role(&self, role: UserRole) -> Result<u64, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.role == role)
            .count() as u64)
    }

    async fn list_birth_dates(&self) -> Result<Vec<Date>, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|user| user.date_of_birth)
            .collect())
    }

    async fn list_created_since(
        &self,
        start: OffsetDateTime,
    ) -> Result<Vec<OffsetDateTime>, RepoError> {
        self.record_read();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| user.created_at >= start)
            .map(|user| user.created_at)
            .collect())
    }
}

#[async_trait]
impl UsersWriteRepo for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            gender: params.gender,
            date_of_birth: params.date_of_birth,
            role: params.role,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CouponsRepo for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<CouponRecord>, RepoError> {
        self.record_read();
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|coupon| coupon.code == code)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<CouponRecord>, RepoError> {
        self.record_read();
        Ok(self.coupons.lock().unwrap().clone())
    }
}

#[async_trait]
impl CouponsWriteRepo for MemoryStore {
    async fn create_coupon(&self, params: CreateCouponParams) -> Result<CouponRecord, RepoError> {
        let mut coupons = self.coupons.lock().unwrap();
        if coupons.iter().any(|coupon| coupon.code == params.code) {
            return Err(RepoError::Duplicate {
                constraint: "coupons_code_key".to_string(),
            });
        }
        let coupon = CouponRecord {
            id: Uuid::new_v4(),
            code: params.code,
            amount: params.amount,
            created_at: OffsetDateTime::now_utc(),
        };
        coupons.push(coupon.clone());
        Ok(coupon)
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool, RepoError> {
        let mut coupons = self.coupons.lock().unwrap();
        let before = coupons.len();
        coupons.retain(|coupon| coupon.code != code);
        Ok(coupons.len() < before)
    }
}
