//! Domain events
use crate::domain::aggregates::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    Coupon(CouponEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Updated { product_id: Uuid, price: Decimal },
    Deleted { product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: Uuid, total: Decimal },
    StatusAdvanced { order_id: Uuid, status: OrderStatus },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Issued { code: String },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "storefront.product.created",
            Self::Product(ProductEvent::Updated { .. }) => "storefront.product.updated",
            Self::Product(ProductEvent::Deleted { .. }) => "storefront.product.deleted",
            Self::Order(OrderEvent::Placed { .. }) => "storefront.order.placed",
            Self::Order(OrderEvent::StatusAdvanced { .. }) => "storefront.order.status_advanced",
            Self::Coupon(CouponEvent::Issued { .. }) => "storefront.coupon.issued",
        }
    }
}

impl From<ProductEvent> for DomainEvent {
    fn from(e: ProductEvent) -> Self { Self::Product(e) }
}

impl From<OrderEvent> for DomainEvent {
    fn from(e: OrderEvent) -> Self { Self::Order(e) }
}

impl From<CouponEvent> for DomainEvent {
    fn from(e: CouponEvent) -> Self { Self::Coupon(e) }
}
