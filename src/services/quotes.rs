//! Prices the singleton product for a requested quantity and optional coupon.

use chrono::Utc;
use serde::Deserialize;

use crate::domain::aggregates::Product;
use crate::domain::pricing::{PriceInputs, Quote};
use crate::domain::value_objects::{CouponCode, DiscountPercent, Quantity};
use crate::error::{Result, StorefrontError};
use crate::services::coupons;
use crate::store::Store;

#[derive(Clone, Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub coupon_code: Option<CouponCode>,
}

pub async fn price(store: &dyn Store, request: &QuoteRequest) -> Result<(Product, Quote)> {
    let product = store.product().await?.ok_or(StorefrontError::ProductNotFound)?;
    let discount = match &request.coupon_code {
        Some(code) => coupons::validate(store, code, Utc::now()).await?,
        None => DiscountPercent::NONE,
    };
    let quote = PriceInputs {
        unit_price: product.price,
        quantity: request.quantity,
        weight: product.weight,
        discount,
    }
    .quote()?;
    Ok((product, quote))
}
