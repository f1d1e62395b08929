//! EcoJardim API Server
//!
//! Main entry point for the storefront and employee console backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jardim_api::{AppState, create_router};
use jardim_core::notify::sender_from_config;
use jardim_core::store::EntityStore;
use jardim_db::{SeaEntityStore, connect};
use jardim_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jardim=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");
    let store: Arc<dyn EntityStore> = Arc::new(SeaEntityStore::new(db));

    let notifier = sender_from_config(&config.email, &config.store, store.clone());

    let state = AppState::new(
        store,
        notifier,
        JwtService::new(&config.jwt),
        &config.store,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        shipping_cost = %config.store.shipping_cost,
        "Server listening on {}", addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
