//! Checkout state machine.
//!
//! `Idle → Priced → Authorized → Recorded → Confirmed`, with `Failed`
//! reachable from any non-terminal state. A failure after authorization keeps
//! the payment reference so a captured-but-unrecorded payment can be
//! reconciled.

use uuid::Uuid;
use crate::domain::pricing::Quote;

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutState {
    Idle,
    Priced { quote: Quote },
    Authorized { quote: Quote, payment_id: String },
    Recorded { quote: Quote, payment_id: String, order_id: Uuid },
    Confirmed { order_id: Uuid, payment_id: String },
    Failed { stage: CheckoutStage, reason: String, payment_id: Option<String> },
}

/// Step that was in progress when a checkout failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStage { Pricing, Authorization, Recording, Confirmation }

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Priced { .. } => "priced",
            Self::Authorized { .. } => "authorized",
            Self::Recorded { .. } => "recorded",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Confirmed { .. } | Self::Failed { .. }) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid checkout transition from {from} to {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Clone, Debug)]
pub struct Checkout {
    state: CheckoutState,
}

impl Default for Checkout {
    fn default() -> Self { Self { state: CheckoutState::Idle } }
}

impl Checkout {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self) -> &CheckoutState { &self.state }

    pub fn priced(&mut self, quote: Quote) -> Result<(), TransitionError> {
        self.transition("priced", |s| match s {
            CheckoutState::Idle => Ok(CheckoutState::Priced { quote }),
            other => Err(other),
        })
    }

    pub fn authorized(&mut self, payment_id: impl Into<String>) -> Result<(), TransitionError> {
        let payment_id = payment_id.into();
        self.transition("authorized", |s| match s {
            CheckoutState::Priced { quote } => Ok(CheckoutState::Authorized { quote, payment_id }),
            other => Err(other),
        })
    }

    pub fn recorded(&mut self, order_id: Uuid) -> Result<(), TransitionError> {
        self.transition("recorded", |s| match s {
            CheckoutState::Authorized { quote, payment_id } => Ok(CheckoutState::Recorded { quote, payment_id, order_id }),
            other => Err(other),
        })
    }

    pub fn confirmed(&mut self) -> Result<(), TransitionError> {
        self.transition("confirmed", |s| match s {
            CheckoutState::Recorded { payment_id, order_id, .. } => Ok(CheckoutState::Confirmed { order_id, payment_id }),
            other => Err(other),
        })
    }

    pub fn failed(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        let reason = reason.into();
        self.transition("failed", |s| {
            let (stage, payment_id) = match s {
                CheckoutState::Idle => (CheckoutStage::Pricing, None),
                CheckoutState::Priced { .. } => (CheckoutStage::Authorization, None),
                CheckoutState::Authorized { payment_id, .. } => (CheckoutStage::Recording, Some(payment_id)),
                CheckoutState::Recorded { payment_id, .. } => (CheckoutStage::Confirmation, Some(payment_id)),
                other => return Err(other),
            };
            Ok(CheckoutState::Failed { stage, reason, payment_id })
        })
    }

    /// Failed after the processor accepted the payment.
    pub fn needs_reconciliation(&self) -> bool {
        matches!(self.state, CheckoutState::Failed { payment_id: Some(_), .. })
    }

    fn transition<F>(&mut self, to: &'static str, f: F) -> Result<(), TransitionError>
    where
        F: FnOnce(CheckoutState) -> Result<CheckoutState, CheckoutState>,
    {
        let current = std::mem::replace(&mut self.state, CheckoutState::Idle);
        let from = current.name();
        match f(current) {
            Ok(next) => {
                tracing::debug!(from, to, "checkout transition");
                self.state = next;
                Ok(())
            }
            Err(unchanged) => {
                self.state = unchanged;
                Err(TransitionError { from, to })
            }
        }
    }
}
