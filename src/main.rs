//! OpenSASE Storefront - single-product store service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opensase_storefront::assets::CloudinaryHost;
use opensase_storefront::auth::SessionVerifier;
use opensase_storefront::events::EventPublisher;
use opensase_storefront::payments::StripeGateway;
use opensase_storefront::store::PgStore;
use opensase_storefront::{router, AppState, Config, StorefrontSettings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        payments: Arc::new(StripeGateway::new(config.stripe.secret_key.clone(), config.stripe.currency.clone())),
        assets: Arc::new(CloudinaryHost::new(config.cloudinary.clone())),
        sessions: SessionVerifier::new(&config.session_secret),
        events: EventPublisher::new(nats),
        settings: StorefrontSettings::from(&config),
    };

    tracing::info!("🚀 OpenSASE Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, router(state)).await?;
    Ok(())
}
