//! Value Objects for the storefront

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount exceeds the supported maximum")]
    AmountOverflow,
    #[error("weight must not be negative")]
    NegativeWeight,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("quantity too large")]
    QuantityTooLarge,
    #[error("discount must be between 0 and 100 percent")]
    DiscountOutOfRange,
    #[error("coupon code must not be empty")]
    EmptyCode,
    #[error("coupon code too long")]
    CodeTooLong,
}

/// Non-negative amount in major currency units. The storefront trades in a
/// single currency, so no currency tag is carried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// Largest amount a `NUMERIC(12, 2)` column holds.
    pub const MAX_STORED: Money = Money(dec!(9999999999.99));

    pub fn new(amount: Decimal) -> Result<Self, ValueError> {
        if amount < Decimal::ZERO {
            return Err(ValueError::NegativeAmount);
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal { self.0 }

    pub fn add(&self, other: Money) -> Result<Money, ValueError> {
        self.0.checked_add(other.0).map(Money).ok_or(ValueError::AmountOverflow)
    }

    /// Subtraction floored at zero.
    pub fn less(&self, other: Money) -> Money { Money((self.0 - other.0).max(Decimal::ZERO)) }

    pub fn multiply(&self, qty: Quantity) -> Result<Money, ValueError> {
        self.0.checked_mul(Decimal::from(qty.value())).map(Money).ok_or(ValueError::AmountOverflow)
    }

    pub fn percent(&self, pct: DiscountPercent) -> Result<Money, ValueError> {
        self.0
            .checked_mul(pct.value())
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .map(Money)
            .ok_or(ValueError::AmountOverflow)
    }

    /// Fits the persisted precision: cents, at most [`Money::MAX_STORED`].
    pub fn is_storable(&self) -> bool {
        self.0 <= Self::MAX_STORED.0 && self.0.normalize().scale() <= 2
    }

    /// Rounded to cents, half away from zero.
    pub fn rounded(&self) -> Money {
        Money(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn to_minor_units(&self) -> Result<MinorUnits, ValueError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(ValueError::AmountOverflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(MinorUnits)
            .ok_or(ValueError::AmountOverflow)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Money> for Decimal {
    fn from(m: Money) -> Self { m.0 }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

/// Amount in the smallest currency denomination (cents), as payment processors expect it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub fn new(value: i64) -> Result<Self, ValueError> {
        if value < 0 { return Err(ValueError::NegativeAmount); }
        Ok(Self(value))
    }
    pub fn value(&self) -> i64 { self.0 }
}

impl TryFrom<i64> for MinorUnits {
    type Error = ValueError;
    fn try_from(value: i64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<MinorUnits> for i64 {
    fn from(m: MinorUnits) -> Self { m.0 }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Shipping weight in kilograms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Weight(Decimal);

impl Weight {
    pub fn kilograms(value: Decimal) -> Result<Self, ValueError> {
        if value < Decimal::ZERO { return Err(ValueError::NegativeWeight); }
        Ok(Self(value))
    }
    pub fn value(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }

    /// Fits `NUMERIC(10, 3)`.
    pub fn is_storable(&self) -> bool {
        self.0 <= dec!(9999999.999) && self.0.normalize().scale() <= 3
    }
}

impl TryFrom<Decimal> for Weight {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::kilograms(value) }
}

impl From<Weight> for Decimal {
    fn from(w: Weight) -> Self { w.0 }
}

/// Quantity of the single SKU, always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    /// Orders store quantity as a Postgres `INTEGER`.
    pub const MAX: u32 = i32::MAX as u32;

    pub fn new(value: u32) -> Result<Self, ValueError> {
        if value == 0 { return Err(ValueError::ZeroQuantity); }
        if value > Self::MAX { return Err(ValueError::QuantityTooLarge); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

impl TryFrom<u32> for Quantity {
    type Error = ValueError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self { q.0 }
}

/// Percentage discount in the closed range 0..=100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    pub const NONE: DiscountPercent = DiscountPercent(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, ValueError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(ValueError::DiscountOutOfRange);
        }
        Ok(Self(value))
    }
    pub fn value(&self) -> Decimal { self.0 }

    /// At most two decimal places, as `NUMERIC(5, 2)` stores it.
    pub fn is_storable(&self) -> bool { self.0.normalize().scale() <= 2 }
}

impl TryFrom<Decimal> for DiscountPercent {
    type Error = ValueError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<DiscountPercent> for Decimal {
    fn from(d: DiscountPercent) -> Self { d.0 }
}

/// Coupon code. Matching is exact and case-sensitive, so no normalisation happens here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.is_empty() { return Err(ValueError::EmptyCode); }
        if value.chars().count() > Self::MAX_LEN { return Err(ValueError::CodeTooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for CouponCode {
    type Error = ValueError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<CouponCode> for String {
    fn from(c: CouponCode) -> Self { c.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
