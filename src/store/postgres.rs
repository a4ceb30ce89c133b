//! Postgres store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::domain::aggregates::{Coupon, NewCoupon, NewOrder, Order, Product, ProductDraft, User};
use crate::domain::value_objects::{CouponCode, DiscountPercent, Money, Quantity, Weight};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[derive(sqlx::FromRow)]
struct ProductRow { id: Uuid, name: String, description: String, price: Decimal, weight: Decimal, image: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc> }

#[derive(sqlx::FromRow)]
struct CouponRow { id: Uuid, code: String, discount: Decimal, expires_at: DateTime<Utc>, created_at: DateTime<Utc> }

#[derive(sqlx::FromRow)]
struct OrderRow { id: Uuid, user_id: Uuid, product_id: Uuid, quantity: i32, total: Decimal, status: String, payment_ref: Option<String>, created_at: DateTime<Utc> }

#[derive(sqlx::FromRow)]
struct UserRow { id: Uuid, name: String, email: String, role: String }

fn corrupt(e: impl std::fmt::Display) -> StoreError { StoreError::Corrupt(e.to_string()) }

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;
    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: r.id, name: r.name, description: r.description,
            price: Money::new(r.price).map_err(corrupt)?, weight: Weight::kilograms(r.weight).map_err(corrupt)?,
            image: r.image, created_at: r.created_at, updated_at: r.updated_at,
        })
    }
}

impl TryFrom<CouponRow> for Coupon {
    type Error = StoreError;
    fn try_from(r: CouponRow) -> Result<Self, Self::Error> {
        Ok(Coupon {
            id: r.id, code: CouponCode::new(r.code).map_err(corrupt)?,
            discount: DiscountPercent::new(r.discount).map_err(corrupt)?,
            expires_at: r.expires_at, created_at: r.created_at,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;
    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity).map_err(corrupt)?;
        Ok(Order {
            id: r.id, user_id: r.user_id, product_id: r.product_id,
            quantity: Quantity::new(quantity).map_err(corrupt)?, total: Money::new(r.total).map_err(corrupt)?,
            status: r.status.parse().map_err(corrupt)?, payment_ref: r.payment_ref, created_at: r.created_at,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;
    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User { id: r.id, name: r.name, email: r.email, role: r.role.parse().map_err(corrupt)? })
    }
}

fn conflict_on_unique(what: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        let unique = e.as_database_error().and_then(|d| d.code()).is_some_and(|code| code == UNIQUE_VIOLATION);
        if unique { StoreError::Conflict(what) } else { StoreError::from(e) }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn product(&self) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, ProductRow>("SELECT id, name, description, price, weight, image, created_at, updated_at FROM products LIMIT 1")
            .fetch_optional(&self.db).await?.map(Product::try_from).transpose()
    }

    async fn product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, ProductRow>("SELECT id, name, description, price, weight, image, created_at, updated_at FROM products WHERE id = $1")
            .bind(id).fetch_optional(&self.db).await?.map(Product::try_from).transpose()
    }

    async fn create_product(&self, d: ProductDraft) -> StoreResult<Product> {
        sqlx::query_as::<_, ProductRow>("INSERT INTO products (id, name, description, price, weight, image, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING id, name, description, price, weight, image, created_at, updated_at")
            .bind(Uuid::now_v7()).bind(&d.name).bind(&d.description).bind(d.price.amount()).bind(d.weight.value()).bind(&d.image)
            .fetch_one(&self.db).await.map_err(conflict_on_unique("product"))?.try_into()
    }

    async fn update_product(&self, id: Uuid, d: ProductDraft) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, ProductRow>("UPDATE products SET name = $2, description = $3, price = $4, weight = $5, image = $6, updated_at = NOW() WHERE id = $1 RETURNING id, name, description, price, weight, image, created_at, updated_at")
            .bind(id).bind(&d.name).bind(&d.description).bind(d.price.amount()).bind(d.weight.value()).bind(&d.image)
            .fetch_optional(&self.db).await?.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn active_coupon(&self, code: &CouponCode, now: DateTime<Utc>) -> StoreResult<Option<Coupon>> {
        sqlx::query_as::<_, CouponRow>("SELECT id, code, discount, expires_at, created_at FROM coupons WHERE code = $1 AND expires_at > $2")
            .bind(code.as_str()).bind(now).fetch_optional(&self.db).await?.map(Coupon::try_from).transpose()
    }

    async fn insert_coupon(&self, c: NewCoupon) -> StoreResult<Coupon> {
        sqlx::query_as::<_, CouponRow>("INSERT INTO coupons (id, code, discount, expires_at, created_at) VALUES ($1, $2, $3, $4, NOW()) RETURNING id, code, discount, expires_at, created_at")
            .bind(Uuid::now_v7()).bind(c.code.as_str()).bind(c.discount.value()).bind(c.expires_at)
            .fetch_one(&self.db).await.map_err(conflict_on_unique("coupon"))?.try_into()
    }

    async fn insert_order(&self, o: NewOrder) -> StoreResult<Order> {
        let quantity = i32::try_from(o.quantity().value()).map_err(corrupt)?;
        sqlx::query_as::<_, OrderRow>("INSERT INTO orders (id, user_id, product_id, quantity, total, status, payment_ref, created_at) VALUES ($1, $2, $3, $4, $5, 'pending', $6, NOW()) RETURNING id, user_id, product_id, quantity, total, status, payment_ref, created_at")
            .bind(Uuid::now_v7()).bind(o.user_id()).bind(o.product_id()).bind(quantity).bind(o.total().amount()).bind(o.payment_ref())
            .fetch_one(&self.db).await?.try_into()
    }

    async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        sqlx::query_as::<_, OrderRow>("SELECT id, user_id, product_id, quantity, total, status, payment_ref, created_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id).fetch_all(&self.db).await?.into_iter().map(Order::try_from).collect()
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT id, name, email, role FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.db).await?.map(User::try_from).transpose()
    }
}
