//! Order-total pricing.
//!
//! `subtotal = price × qty`, `shipping = ceil(weight × 0.5)`,
//! `total = subtotal − subtotal × discount / 100 + shipping`.
//! Shipping is charged on a single unit's weight regardless of quantity.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use crate::domain::value_objects::{DiscountPercent, MinorUnits, Money, Quantity, ValueError, Weight};

/// Flat shipping rate per kilogram, rounded up to the next whole currency unit.
pub const SHIPPING_RATE_PER_KG: Decimal = dec!(0.5);

#[derive(Clone, Copy, Debug)]
pub struct PriceInputs {
    pub unit_price: Money,
    pub quantity: Quantity,
    pub weight: Weight,
    pub discount: DiscountPercent,
}

/// Priced breakdown of a checkout. `total` is rounded to cents; `exact_total`
/// keeps full precision for the payment amount.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quote {
    pub unit_price: Money,
    pub quantity: Quantity,
    pub subtotal: Money,
    pub shipping: Money,
    pub discount_percent: DiscountPercent,
    pub discount_amount: Money,
    pub total: Money,
    #[serde(skip)]
    exact_total: Money,
}

pub fn shipping_cost(weight: Weight) -> Result<Money, ValueError> {
    let raw = weight.value().checked_mul(SHIPPING_RATE_PER_KG).ok_or(ValueError::AmountOverflow)?;
    Money::new(raw.ceil())
}

impl PriceInputs {
    /// Fails with [`ValueError::AmountOverflow`] when the total exceeds what an
    /// order can store.
    pub fn quote(&self) -> Result<Quote, ValueError> {
        let subtotal = self.unit_price.multiply(self.quantity)?;
        let shipping = shipping_cost(self.weight)?;
        let discount_amount = subtotal.percent(self.discount)?;
        let exact_total = subtotal.less(discount_amount).add(shipping)?;
        let total = exact_total.rounded();
        if total > Money::MAX_STORED {
            return Err(ValueError::AmountOverflow);
        }
        Ok(Quote {
            unit_price: self.unit_price,
            quantity: self.quantity,
            subtotal,
            shipping,
            discount_percent: self.discount,
            discount_amount,
            total,
            exact_total,
        })
    }
}

impl Quote {
    /// Amount submitted to the payment processor.
    pub fn amount_minor(&self) -> Result<MinorUnits, ValueError> {
        self.exact_total.to_minor_units()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inputs(price: Decimal, qty: u32, weight: Decimal, discount: Decimal) -> PriceInputs {
        PriceInputs {
            unit_price: Money::new(price).unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            weight: Weight::kilograms(weight).unwrap(),
            discount: DiscountPercent::new(discount).unwrap(),
        }
    }

    #[test]
    fn test_reference_checkout() {
        let q = inputs(dec!(20.00), 3, dec!(4), dec!(10)).quote().unwrap();
        assert_eq!(q.subtotal.amount(), dec!(60));
        assert_eq!(q.shipping.amount(), dec!(2));
        assert_eq!(q.discount_amount.amount(), dec!(6));
        assert_eq!(q.total.amount(), dec!(56));
        assert_eq!(q.amount_minor().unwrap().value(), 5600);
    }

    #[test]
    fn test_zero_discount_is_subtotal_plus_shipping() {
        let q = inputs(dec!(12.50), 2, dec!(3), Decimal::ZERO).quote().unwrap();
        assert_eq!(q.total.amount(), dec!(25) + dec!(2));
    }

    #[test]
    fn test_shipping_rounds_up_and_ignores_quantity() {
        assert_eq!(shipping_cost(Weight::kilograms(dec!(0)).unwrap()).unwrap().amount(), dec!(0));
        assert_eq!(shipping_cost(Weight::kilograms(dec!(0.1)).unwrap()).unwrap().amount(), dec!(1));
        assert_eq!(shipping_cost(Weight::kilograms(dec!(5)).unwrap()).unwrap().amount(), dec!(3));
        let one = inputs(dec!(1), 1, dec!(5), Decimal::ZERO).quote().unwrap();
        let many = inputs(dec!(1), 10, dec!(5), Decimal::ZERO).quote().unwrap();
        assert_eq!(one.shipping, many.shipping);
    }

    #[test]
    fn test_full_discount_leaves_shipping() {
        let q = inputs(dec!(9.99), 4, dec!(1), dec!(100)).quote().unwrap();
        assert_eq!(q.total.amount(), dec!(1));
    }

    #[test]
    fn test_fractional_totals_round_for_payment() {
        // 19.99 * 1 * 0.85 = 16.9915, + 1 shipping
        let q = inputs(dec!(19.99), 1, dec!(1), dec!(15)).quote().unwrap();
        assert_eq!(q.total.amount(), dec!(17.99));
        assert_eq!(q.amount_minor().unwrap().value(), 1799);
    }

    #[test]
    fn test_overflowing_price_is_an_error() {
        let q = PriceInputs {
            unit_price: Money::new(Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0)).unwrap(),
            quantity: Quantity::new(2).unwrap(),
            weight: Weight::default(),
            discount: DiscountPercent::NONE,
        }
        .quote();
        assert_eq!(q, Err(ValueError::AmountOverflow));
    }

    #[test]
    fn test_total_above_storable_maximum_rejected() {
        assert_eq!(inputs(dec!(20), 1_000_000_000, dec!(1), Decimal::ZERO).quote(), Err(ValueError::AmountOverflow));
        let q = inputs(dec!(9999999998.99), 1, dec!(2), Decimal::ZERO).quote().unwrap();
        assert_eq!(q.total, Money::MAX_STORED);
        assert_eq!(q.amount_minor().unwrap().value(), 999_999_999_999);
    }

    proptest! {
        #[test]
        fn prop_total_matches_formula(
            cents in 0u32..10_000_000,
            qty in 1u32..1_000,
            grams in 0u32..100_000,
            pct in 0u32..=100,
        ) {
            let price = Decimal::new(cents as i64, 2);
            let weight = Decimal::new(grams as i64, 3);
            let discount = Decimal::from(pct);
            let q = inputs(price, qty, weight, discount).quote().unwrap();

            let subtotal = price * Decimal::from(qty);
            let shipping = (weight * dec!(0.5)).ceil();
            let expected = subtotal - subtotal * discount / dec!(100) + shipping;

            prop_assert_eq!(q.subtotal.amount(), subtotal);
            prop_assert_eq!(q.shipping.amount(), shipping);
            prop_assert_eq!(q.total.amount(), expected.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero));
            prop_assert!(q.total.amount() >= Decimal::ZERO);
        }
    }
}
