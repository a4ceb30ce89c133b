//! In-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::domain::aggregates::{Coupon, NewCoupon, NewOrder, Order, Product, ProductDraft, User};
use crate::domain::value_objects::CouponCode;

#[derive(Default)]
pub struct MemoryStore {
    product: RwLock<Option<Product>>,
    coupons: RwLock<HashMap<CouponCode, Coupon>>,
    orders: RwLock<Vec<Order>>,
    users: RwLock<HashMap<Uuid, User>>,
    fail_on_insert_order: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users come from the external sign-in service; this seeds them directly.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn set_fail_on_insert_order(&self, fail: bool) {
        *self.fail_on_insert_order.write().await = fail;
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn product(&self) -> StoreResult<Option<Product>> {
        Ok(self.product.read().await.clone())
    }

    async fn product_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.product.read().await.clone().filter(|p| p.id == id))
    }

    async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        let mut slot = self.product.write().await;
        if slot.is_some() {
            return Err(StoreError::Conflict("product"));
        }
        let product = Product::create(draft);
        *slot = Some(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, draft: ProductDraft) -> StoreResult<Option<Product>> {
        let mut slot = self.product.write().await;
        match slot.as_mut() {
            Some(p) if p.id == id => {
                p.apply(draft);
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let mut slot = self.product.write().await;
        if slot.as_ref().is_some_and(|p| p.id == id) {
            *slot = None;
            return Ok(true);
        }
        Ok(false)
    }

    async fn active_coupon(&self, code: &CouponCode, now: DateTime<Utc>) -> StoreResult<Option<Coupon>> {
        Ok(self.coupons.read().await.get(code).filter(|c| c.is_active_at(now)).cloned())
    }

    async fn insert_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon> {
        let mut coupons = self.coupons.write().await;
        if coupons.contains_key(&coupon.code) {
            return Err(StoreError::Conflict("coupon"));
        }
        let coupon = Coupon::issue(coupon);
        coupons.insert(coupon.code.clone(), coupon.clone());
        Ok(coupon)
    }

    async fn insert_order(&self, order: NewOrder) -> StoreResult<Order> {
        if *self.fail_on_insert_order.read().await {
            return Err(StoreError::Unavailable("order inserts disabled".to_string()));
        }
        let order = order.into_order(Uuid::now_v7(), Utc::now());
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.orders.read().await.iter().filter(|o| o.user_id == user_id).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
