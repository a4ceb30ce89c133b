//! Checkout orchestration: price, authorize payment, record the order, confirm.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::auth::Identity;
use crate::domain::aggregates::{Capability, Order};
use crate::domain::checkout::Checkout;
use crate::domain::pricing::Quote;
use crate::error::{Result, StorefrontError};
use crate::events::EventPublisher;
use crate::payments::PaymentGateway;
use crate::services::{orders, quotes};
use crate::store::Store;

pub type CheckoutRequest = quotes::QuoteRequest;

pub const CONFIRMATION_PATH: &str = "/confirmation";

#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub client_secret: String,
    pub payment_id: String,
    pub quote: Quote,
    pub redirect_to: &'static str,
}

pub struct Orchestrator<'a> {
    pub store: &'a dyn Store,
    pub payments: &'a dyn PaymentGateway,
    pub events: &'a EventPublisher,
    pub sign_in_path: &'a str,
}

impl Orchestrator<'_> {
    /// Runs a checkout to completion. Without an identity nothing is priced or
    /// charged and the caller is pointed at the sign-in path.
    #[instrument(skip_all, fields(quantity = request.quantity.value()))]
    pub async fn run(&self, identity: Option<&Identity>, request: &CheckoutRequest) -> Result<CheckoutReceipt> {
        let identity = identity.ok_or_else(|| StorefrontError::SignInRequired { sign_in: self.sign_in_path.to_string() })?;
        identity.require(Capability::PlaceOrders)?;

        let mut checkout = Checkout::new();
        let priced = quotes::price(self.store, request)
            .await
            .and_then(|(product, quote)| Ok((product, quote, quote.amount_minor()?)));
        let (product, quote, amount) = match priced {
            Ok(priced) => priced,
            Err(e) => {
                checkout.failed(e.to_string())?;
                warn!(error = %e, "checkout could not be priced");
                return Err(e);
            }
        };
        checkout.priced(quote)?;

        let payment = match self.payments.authorize(amount).await {
            Ok(payment) => payment,
            Err(e) => {
                checkout.failed(e.to_string())?;
                warn!(error = %e, "payment authorization failed");
                return Err(e.into());
            }
        };
        checkout.authorized(payment.id.clone())?;

        let order = match orders::record(self.store, self.events, identity, product.id, &quote, Some(payment.id.clone())).await {
            Ok(order) => order,
            Err(e) => {
                checkout.failed(e.to_string())?;
                error!(
                    payment_id = %payment.id,
                    user_id = %identity.user_id,
                    amount = %amount,
                    needs_reconciliation = checkout.needs_reconciliation(),
                    error = %e,
                    "payment authorized but order not recorded"
                );
                return Err(StorefrontError::OrderNotRecorded { payment_id: payment.id });
            }
        };
        checkout.recorded(order.id)?;
        checkout.confirmed()?;
        info!(order_id = %order.id, payment_id = %payment.id, "checkout confirmed");

        Ok(CheckoutReceipt {
            order,
            client_secret: payment.client_secret,
            payment_id: payment.id,
            quote,
            redirect_to: CONFIRMATION_PATH,
        })
    }
}
