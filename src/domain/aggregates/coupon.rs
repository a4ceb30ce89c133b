//! Coupon Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{CouponCode, DiscountPercent};

/// Percentage coupon. Immutable once issued and redeemable any number of
/// times until `expires_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: CouponCode,
    pub discount: DiscountPercent,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewCoupon {
    pub code: CouponCode,
    #[validate(custom = "storable_discount")]
    pub discount: DiscountPercent,
    pub expires_at: DateTime<Utc>,
}

fn storable_discount(discount: &DiscountPercent) -> Result<(), ValidationError> {
    if !discount.is_storable() {
        return Err(ValidationError::new("discount must have at most 2 decimal places"));
    }
    Ok(())
}

impl Coupon {
    pub fn issue(new: NewCoupon) -> Self {
        Self { id: Uuid::now_v7(), code: new.code, discount: new.discount, expires_at: new.expires_at, created_at: Utc::now() }
    }

    /// Valid strictly before the expiration instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool { self.expires_at > now }
}
