//! Coupon validation and issuance.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::aggregates::{Coupon, NewCoupon};
use crate::domain::events::CouponEvent;
use crate::domain::value_objects::{CouponCode, DiscountPercent};
use crate::error::{Result, StorefrontError};
use crate::events::EventPublisher;
use crate::store::Store;

/// Discount for `code` if an exactly matching coupon has not yet expired.
/// Unknown and expired codes are indistinguishable to the caller.
#[instrument(skip_all, fields(code = %code))]
pub async fn validate(store: &dyn Store, code: &CouponCode, now: DateTime<Utc>) -> Result<DiscountPercent> {
    store.active_coupon(code, now).await?.map(|c| c.discount).ok_or(StorefrontError::InvalidCoupon)
}

#[instrument(skip_all, fields(code = %coupon.code))]
pub async fn issue(store: &dyn Store, events: &EventPublisher, coupon: NewCoupon) -> Result<Coupon> {
    coupon.validate()?;
    let coupon = store.insert_coupon(coupon).await?;
    info!(discount = %coupon.discount.value(), expires_at = %coupon.expires_at, "coupon issued");
    events.publish(CouponEvent::Issued { code: coupon.code.to_string() }).await;
    Ok(coupon)
}
