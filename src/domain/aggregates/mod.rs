//! Aggregates module
pub mod product;
pub mod order;
pub mod coupon;
pub mod user;

pub use product::{Product, ProductDraft};
pub use order::{NewOrder, Order, OrderError, OrderStatus};
pub use coupon::{Coupon, NewCoupon};
pub use user::{Capability, Role, UnknownRole, User};
