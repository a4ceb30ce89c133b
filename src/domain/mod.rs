//! Storefront domain model
pub mod aggregates;
pub mod checkout;
pub mod events;
pub mod pricing;
pub mod value_objects;
