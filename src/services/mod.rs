//! Storefront operations, shared by the HTTP handlers.
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod orders;
pub mod quotes;
