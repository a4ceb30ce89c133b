use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{can, Authorized, Identity};
use crate::domain::aggregates::{Coupon, NewCoupon, Order, Product, ProductDraft};
use crate::domain::pricing::Quote;
use crate::domain::value_objects::{CouponCode, DiscountPercent, MinorUnits};
use crate::error::{Result, StorefrontError};
use crate::services::checkout::{CheckoutReceipt, CheckoutRequest, Orchestrator};
use crate::services::orders::{OrderView, PlaceOrderRequest};
use crate::services::quotes::QuoteRequest;
use crate::services::{catalog, coupons, orders, quotes};
use crate::AppState;

type Body<T> = std::result::Result<Json<T>, JsonRejection>;

pub async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::list(s.store.as_ref()).await?))
}

pub async fn admin_list_products(State(s): State<AppState>, _admin: Authorized<can::ManageCatalog>) -> Result<Json<Vec<Product>>> {
    Ok(Json(catalog::list(s.store.as_ref()).await?))
}

pub async fn upsert_product(
    State(s): State<AppState>,
    _admin: Authorized<can::ManageCatalog>,
    body: Body<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(draft) = body?;
    let status = if draft.id.is_some() { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(catalog::upsert(s.store.as_ref(), &s.events, draft).await?)))
}

pub async fn update_product(
    State(s): State<AppState>,
    _admin: Authorized<can::ManageCatalog>,
    Path(id): Path<Uuid>,
    body: Body<ProductDraft>,
) -> Result<Json<Product>> {
    let Json(draft) = body?;
    Ok(Json(catalog::update(s.store.as_ref(), &s.events, id, draft).await?))
}

pub async fn delete_product(State(s): State<AppState>, _admin: Authorized<can::ManageCatalog>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    catalog::delete(s.store.as_ref(), &s.events, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn issue_coupon(
    State(s): State<AppState>,
    _admin: Authorized<can::IssueCoupons>,
    body: Body<NewCoupon>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let Json(coupon) = body?;
    Ok((StatusCode::CREATED, Json(coupons::issue(s.store.as_ref(), &s.events, coupon).await?)))
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest { pub code: CouponCode }

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse { pub discount: DiscountPercent }

pub async fn validate_coupon(State(s): State<AppState>, body: Body<ValidateCouponRequest>) -> Result<Json<ValidateCouponResponse>> {
    let Json(req) = body?;
    let discount = coupons::validate(s.store.as_ref(), &req.code, Utc::now()).await?;
    Ok(Json(ValidateCouponResponse { discount }))
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub product: Product,
    #[serde(flatten)]
    pub quote: Quote,
    pub amount_minor: MinorUnits,
}

pub async fn quote(State(s): State<AppState>, body: Body<QuoteRequest>) -> Result<Json<QuoteResponse>> {
    let Json(req) = body?;
    let (product, quote) = quotes::price(s.store.as_ref(), &req).await?;
    Ok(Json(QuoteResponse { product, amount_minor: quote.amount_minor()?, quote }))
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest { pub amount: MinorUnits }

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse { pub client_secret: String }

pub async fn create_payment_intent(
    State(s): State<AppState>,
    _shopper: Authorized<can::PlaceOrders>,
    body: Body<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>> {
    let Json(req) = body?;
    let payment = s.payments.authorize(req.amount).await?;
    tracing::info!(payment_id = %payment.id, amount = %req.amount, "payment intent created");
    Ok(Json(PaymentIntentResponse { client_secret: payment.client_secret }))
}

pub async fn payment_config(State(s): State<AppState>) -> Json<Value> {
    Json(json!({ "publishableKey": s.settings.publishable_key, "currency": s.settings.currency }))
}

pub async fn list_orders(State(s): State<AppState>, shopper: Authorized<can::PlaceOrders>) -> Result<Json<Vec<OrderView>>> {
    Ok(Json(orders::list_for(s.store.as_ref(), &shopper.identity).await?))
}

pub async fn create_order(
    State(s): State<AppState>,
    shopper: Authorized<can::PlaceOrders>,
    body: Body<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(req) = body?;
    let order = orders::place(s.store.as_ref(), &s.events, &shopper.identity, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Only a request without a session is sent to sign in; a bad session or a
/// failed user lookup is reported as such.
pub async fn checkout(
    State(s): State<AppState>,
    identity: std::result::Result<Identity, StorefrontError>,
    body: Body<CheckoutRequest>,
) -> Result<Json<CheckoutReceipt>> {
    let identity = match identity {
        Ok(identity) => Some(identity),
        Err(StorefrontError::Unauthenticated) => None,
        Err(e) => return Err(e),
    };
    let Json(req) = body?;
    let orchestrator = Orchestrator {
        store: s.store.as_ref(),
        payments: s.payments.as_ref(),
        events: &s.events,
        sign_in_path: &s.settings.sign_in_path,
    };
    Ok(Json(orchestrator.run(identity.as_ref(), &req).await?))
}

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest { pub image: String }

pub async fn upload_image(
    State(s): State<AppState>,
    _admin: Authorized<can::UploadImages>,
    body: Body<UploadImageRequest>,
) -> Result<Json<Value>> {
    let Json(req) = body?;
    if req.image.trim().is_empty() {
        return Err(StorefrontError::Validation("image must not be empty".into()));
    }
    let url = s.assets.upload(&req.image).await?;
    tracing::info!(%url, "image uploaded");
    Ok(Json(json!({ "url": url })))
}
