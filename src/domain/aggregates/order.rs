//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::events::OrderEvent;
use crate::domain::pricing::Quote;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Quantity,
    pub total: Money,
    pub status: OrderStatus,
    /// Processor reference of the payment that paid for this order.
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Linear fulfilment progression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// An order that has been priced but not yet persisted. The only way to
/// build one is from a [`Quote`], so the stored total is always the
/// calculator's output.
#[derive(Clone, Debug)]
pub struct NewOrder {
    user_id: Uuid,
    product_id: Uuid,
    quantity: Quantity,
    total: Money,
    payment_ref: Option<String>,
}

impl NewOrder {
    pub fn priced(user_id: Uuid, product_id: Uuid, quote: &Quote, payment_ref: Option<String>) -> Self {
        Self { user_id, product_id, quantity: quote.quantity, total: quote.total, payment_ref }
    }

    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn product_id(&self) -> Uuid { self.product_id }
    pub fn quantity(&self) -> Quantity { self.quantity }
    pub fn total(&self) -> Money { self.total }
    pub fn payment_ref(&self) -> Option<&str> { self.payment_ref.as_deref() }

    pub fn into_order(self, id: Uuid, created_at: DateTime<Utc>) -> Order {
        Order {
            id, user_id: self.user_id, product_id: self.product_id, quantity: self.quantity,
            total: self.total, status: OrderStatus::Pending, payment_ref: self.payment_ref, created_at,
        }
    }
}

impl Order {
    pub fn advance(&mut self) -> Result<OrderEvent, OrderError> {
        let next = self.status.next().ok_or(OrderError::AlreadyDelivered)?;
        self.status = next;
        Ok(OrderEvent::StatusAdvanced { order_id: self.id, status: next })
    }

    pub fn placed_event(&self) -> OrderEvent {
        OrderEvent::Placed { order_id: self.id, user_id: self.user_id, total: self.total.amount() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order already delivered")]
    AlreadyDelivered,
    #[error("unknown order status {0:?}")]
    UnknownStatus(String),
}
