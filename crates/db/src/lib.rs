//! Database layer with `SeaORM` entities and the Postgres entity store.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for customers, orders, budgets and audit logs
//! - [`SeaEntityStore`], the Postgres implementation of `jardim_core::store::EntityStore`
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod store;

pub use store::SeaEntityStore;

use jardim_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
