//! Database migration runner for the EcoJardim backend.
//!
//! Usage:
//!   jardim-migrator up      - Run all pending migrations
//!   jardim-migrator down    - Rollback last migration
//!   jardim-migrator status  - Show migration status
//!   jardim-migrator fresh   - Drop all tables and re-run migrations
//!
//! The connection string is read from `DATABASE_URL`.

use jardim_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // sets up its own tracing
    cli::run_cli(Migrator).await;
}
