//! Persistence for products, coupons, orders and users.
//!
//! [`PgStore`] is the production backend; [`MemoryStore`] serves tests and
//! local runs without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::{Coupon, NewCoupon, NewOrder, Order, Product, ProductDraft, User};
use crate::domain::value_objects::CouponCode;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("stored record is invalid: {0}")]
    Corrupt(String),
    /// The database refused a value (check constraint or numeric overflow).
    #[error("{0}")]
    Rejected(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

const CHECK_VIOLATION: &str = "23514";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// SQLSTATEs caused by the submitted values rather than the database.
fn rejects_input(sqlstate: &str) -> bool {
    sqlstate == CHECK_VIOLATION || sqlstate == NUMERIC_VALUE_OUT_OF_RANGE
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let rejected = e
            .as_database_error()
            .filter(|db| db.code().is_some_and(|code| rejects_input(&code)))
            .map(|db| db.message().to_string());
        match rejected {
            Some(message) => Self::Rejected(message),
            None => Self::Database(e),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// The storefront's single product, if one has been created.
    async fn product(&self) -> StoreResult<Option<Product>>;

    async fn product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>>;

    /// Creates the product. Fails with [`StoreError::Conflict`] when one already exists.
    async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product>;

    async fn update_product(&self, id: Uuid, draft: ProductDraft) -> StoreResult<Option<Product>>;

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;

    /// Coupon with exactly this code whose expiry is strictly after `now`.
    async fn active_coupon(&self, code: &CouponCode, now: DateTime<Utc>) -> StoreResult<Option<Coupon>>;

    /// Fails with [`StoreError::Conflict`] on a duplicate code.
    async fn insert_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon>;

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order>;

    /// Orders placed by `user_id`, newest first.
    async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>>;

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>>;
}
