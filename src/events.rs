//! Publishes domain events to NATS when a connection is configured.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Best effort: failures are logged and never propagate to the request.
    pub async fn publish(&self, event: impl Into<DomainEvent>) {
        let event = event.into();
        let Some(nats) = &self.nats else {
            tracing::debug!(subject = event.subject(), "event publishing disabled");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode event");
                return;
            }
        };
        if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(subject = event.subject(), error = %e, "failed to publish event");
        }
    }
}
