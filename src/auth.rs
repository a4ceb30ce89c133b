//! Session verification and role-gated extractors.
//!
//! Sessions are HS256 JWTs issued by the external sign-in service and sent as
//! `Authorization: Bearer <token>`. The `sub` claim names a user whose role is
//! read from the store on every request.

use std::marker::PhantomData;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{Capability, Role, User};
use crate::error::StorefrontError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("session expired")]
    Expired,
    #[error("invalid session token")]
    InvalidToken,
}

#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        Self { key: DecodingKey::from_secret(secret.as_bytes()), validation: Validation::new(Algorithm::HS256) }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

fn bearer(parts: &Parts) -> Result<&str, AuthError> {
    parts.headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// The authenticated requester.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for Identity {
    fn from(u: User) -> Self {
        Self { user_id: u.id, name: u.name, email: u.email, role: u.role }
    }
}

impl Identity {
    pub fn require(&self, capability: Capability) -> Result<(), StorefrontError> {
        if self.role.grants(capability) { Ok(()) } else { Err(StorefrontError::NotAuthorized) }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = state.sessions.verify(bearer(parts)?)?;
        let user = state.store.user(claims.sub).await?.ok_or(StorefrontError::InvalidSession)?;
        Ok(user.into())
    }
}

/// Compile-time capability requirement for [`Authorized`].
pub trait RequiredCapability {
    const CAPABILITY: Capability;
}

pub mod can {
    use super::{Capability, RequiredCapability};

    pub struct PlaceOrders;
    pub struct ManageCatalog;
    pub struct IssueCoupons;
    pub struct UploadImages;

    impl RequiredCapability for PlaceOrders { const CAPABILITY: Capability = Capability::PlaceOrders; }
    impl RequiredCapability for ManageCatalog { const CAPABILITY: Capability = Capability::ManageCatalog; }
    impl RequiredCapability for IssueCoupons { const CAPABILITY: Capability = Capability::IssueCoupons; }
    impl RequiredCapability for UploadImages { const CAPABILITY: Capability = Capability::UploadImages; }
}

/// An identity whose role grants `C`. Rejects with 401 before the request
/// body is read, so unauthorized callers never reach a handler.
pub struct Authorized<C> {
    pub identity: Identity,
    _capability: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C: RequiredCapability + Send + Sync + 'static> FromRequestParts<AppState> for Authorized<C> {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        identity.require(C::CAPABILITY)?;
        Ok(Self { identity, _capability: PhantomData })
    }
}
