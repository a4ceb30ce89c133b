//! Payment authorization against an external processor.
//!
//! The processor is Stripe-compatible: a payment intent is created for an
//! amount in minor units and the returned client secret is confirmed by the
//! browser. No idempotency key is sent, so a client retry after a timeout can
//! create a second intent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::value_objects::MinorUnits;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub id: String,
    pub client_secret: String,
    pub status: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Message reported by the processor, passed through unchanged.
    #[error("{0}")]
    Rejected(String),
    #[error("payment processor unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(&self, amount: MinorUnits) -> Result<PaymentAuthorization, PaymentError>;
}

pub struct StripeGateway {
    client: Client,
    secret_key: String,
    currency: String,
    base_url: String,
}

#[derive(Deserialize)]
struct StripeErrorBody { error: StripeErrorDetail }

#[derive(Deserialize)]
struct StripeErrorDetail { message: Option<String> }

impl StripeGateway {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.stripe.com";

    pub fn new(secret_key: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            currency: currency.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn authorize(&self, amount: MinorUnits) -> Result<PaymentAuthorization, PaymentError> {
        let response = self.client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", self.currency.clone()),
                ("automatic_payment_methods[enabled]", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let intent: PaymentAuthorization = response.json().await?;
            debug!(payment_id = %intent.id, %amount, "payment intent created");
            return Ok(intent);
        }

        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => None,
        }
        .unwrap_or_else(|| format!("payment processor returned {status}"));
        warn!(%status, %message, "payment intent rejected");
        Err(PaymentError::Rejected(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_creates_intent_in_minor_units() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("amount=5600"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_1", "client_secret": "pi_1_secret_abc", "status": "requires_payment_method", "amount": 5600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = StripeGateway::new("sk_test_123", "usd").with_base_url(server.uri());
        let auth = gateway.authorize(MinorUnits::new(5600).unwrap()).await.unwrap();
        assert_eq!(auth.id, "pi_1");
        assert_eq!(auth.client_secret, "pi_1_secret_abc");
    }

    #[tokio::test]
    async fn test_processor_message_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "type": "card_error", "message": "Your card was declined." }
            })))
            .mount(&server)
            .await;

        let gateway = StripeGateway::new("sk_test_123", "usd").with_base_url(server.uri());
        let err = gateway.authorize(MinorUnits::new(100).unwrap()).await.unwrap_err();
        assert_eq!(err.to_string(), "Your card was declined.");
    }

    #[tokio::test]
    async fn test_unparseable_error_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let gateway = StripeGateway::new("sk", "usd").with_base_url(server.uri());
        let err = gateway.authorize(MinorUnits::new(1).unwrap()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Rejected(ref m) if m.contains("503")));
    }
}
