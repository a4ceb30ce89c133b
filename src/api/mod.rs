//! HTTP surface.

mod handlers;

use axum::{routing::{get, post, put}, Json, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-storefront"})) }))
        .route("/api/product", get(handlers::list_products))
        .route("/api/admin/product", get(handlers::admin_list_products).post(handlers::upsert_product))
        .route("/api/admin/product/:id", put(handlers::update_product).delete(handlers::delete_product))
        .route("/api/admin/coupons", post(handlers::issue_coupon))
        .route("/api/coupon/validate", post(handlers::validate_coupon))
        .route("/api/quote", post(handlers::quote))
        .route("/api/create-payment-intent", post(handlers::create_payment_intent))
        .route("/api/payment-config", get(handlers::payment_config))
        .route("/api/orders", get(handlers::list_orders).post(handlers::create_order))
        .route("/api/checkout", post(handlers::checkout))
        .route("/api/upload-image", post(handlers::upload_image))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
