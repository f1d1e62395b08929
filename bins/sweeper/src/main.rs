//! Expires every draft or sent budget whose `valid_until` has passed.
//!
//! Meant to be run by an external scheduler (cron, a Kubernetes CronJob).
//! Each expiry goes through the normal transition path, so it is audited
//! under `sweeper.actor_id` and the customer gets a status email when
//! email is enabled. Re-running is a no-op.
//!
//! Usage: jardim-sweeper

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jardim_core::budget::BudgetLifecycleManager;
use jardim_core::notify::sender_from_config;
use jardim_core::store::EntityStore;
use jardim_db::{SeaEntityStore, connect};
use jardim_shared::AppConfig;
use jardim_shared::types::UserId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jardim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store: Arc<dyn EntityStore> =
        Arc::new(SeaEntityStore::new(connect(&config.database).await?));

    let notifier = sender_from_config(&config.email, &config.store, store.clone());

    let actor = UserId::from_uuid(config.sweeper.actor_id);
    let budgets = BudgetLifecycleManager::new(store, notifier);
    let expired = budgets.expire_stale(Utc::now(), actor).await?;

    info!(count = expired.len(), actor = %actor, "Sweep complete");
    Ok(())
}
