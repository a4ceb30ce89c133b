//! OpenSASE Storefront
//!
//! Single-product storefront service.
//!
//! ## Features
//! - Singleton product catalog with admin editing
//! - Pricing with weight-based shipping and percentage coupons
//! - Orchestrated checkout against a card processor
//! - Per-user order history
//! - Image upload to an external asset host

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod payments;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::assets::AssetHost;
use crate::auth::SessionVerifier;
use crate::events::EventPublisher;
use crate::payments::PaymentGateway;
use crate::store::Store;

pub use crate::api::router;
pub use crate::config::Config;
pub use crate::error::{Result, StorefrontError};

/// Values handlers read but never change.
#[derive(Clone, Debug)]
pub struct StorefrontSettings {
    pub sign_in_path: String,
    pub publishable_key: String,
    pub currency: String,
}

impl From<&Config> for StorefrontSettings {
    fn from(c: &Config) -> Self {
        Self {
            sign_in_path: c.sign_in_path.clone(),
            publishable_key: c.stripe.publishable_key.clone(),
            currency: c.stripe.currency.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub assets: Arc<dyn AssetHost>,
    pub sessions: SessionVerifier,
    pub events: EventPublisher,
    pub settings: StorefrontSettings,
}
