//! Error type shared by services and HTTP handlers.
//!
//! Every error maps to a stable machine-readable code. Datastore failures are
//! logged in full and reported to clients only as `internal_error`.

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::assets::AssetError;
use crate::auth::AuthError;
use crate::domain::checkout::TransitionError;
use crate::domain::value_objects::ValueError;
use crate::payments::PaymentError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Sign-in required")]
    SignInRequired { sign_in: String },

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Invalid or expired coupon")]
    InvalidCoupon,

    #[error("{0}")]
    Validation(String),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("{0}")]
    Payment(String),

    #[error("{0}")]
    Upload(String),

    #[error("Payment {payment_id} succeeded but the order could not be recorded")]
    OrderNotRecorded { payment_id: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

impl StorefrontError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidSession | Self::SignInRequired { .. } | Self::NotAuthorized => StatusCode::UNAUTHORIZED,
            Self::ProductNotFound | Self::InvalidCoupon => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Payment(_) | Self::Upload(_) | Self::OrderNotRecorded { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidSession => "invalid_session",
            Self::SignInRequired { .. } => "sign_in_required",
            Self::NotAuthorized => "not_authorized",
            Self::ProductNotFound => "product_not_found",
            Self::InvalidCoupon => "coupon_invalid",
            Self::Validation(_) => "validation_failed",
            Self::Conflict("product") => "product_exists",
            Self::Conflict("coupon") => "coupon_exists",
            Self::Conflict(_) => "conflict",
            Self::Payment(_) => "payment_failed",
            Self::Upload(_) => "upload_failed",
            Self::OrderNotRecorded { .. } => "order_not_recorded",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };
        let mut body = json!({ "error": { "code": self.code(), "message": message } });
        match &self {
            Self::SignInRequired { sign_in } => body["redirect_to"] = json!(sign_in),
            Self::OrderNotRecorded { payment_id } => body["error"]["payment_id"] = json!(payment_id),
            _ => {}
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for StorefrontError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => Self::Conflict(what),
            StoreError::Rejected(message) => Self::Validation(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for StorefrontError {
    fn from(e: ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

impl From<ValueError> for StorefrontError {
    fn from(e: ValueError) -> Self { Self::Validation(e.to_string()) }
}

impl From<PaymentError> for StorefrontError {
    fn from(e: PaymentError) -> Self { Self::Payment(e.to_string()) }
}

impl From<AssetError> for StorefrontError {
    fn from(e: AssetError) -> Self { Self::Upload(e.to_string()) }
}

impl From<AuthError> for StorefrontError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => Self::Unauthenticated,
            AuthError::Expired | AuthError::InvalidToken => Self::InvalidSession,
        }
    }
}

impl From<JsonRejection> for StorefrontError {
    fn from(e: JsonRejection) -> Self { Self::Validation(e.body_text()) }
}

impl From<TransitionError> for StorefrontError {
    fn from(e: TransitionError) -> Self { Self::Internal(e.to_string()) }
}
