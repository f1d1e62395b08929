//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for checkout, orders, budgets and audit history
//! - Bearer token authentication middleware and extractors
//! - The `{ success, data | error, message }` response envelope

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use jardim_core::audit::AuditLogWriter;
use jardim_core::budget::BudgetLifecycleManager;
use jardim_core::checkout::CheckoutService;
use jardim_core::notify::NotificationSender;
use jardim_core::order::OrderLifecycleManager;
use jardim_core::store::EntityStore;
use jardim_shared::{JwtService, StoreConfig};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Order lifecycle operations.
    pub orders: OrderLifecycleManager,
    /// Budget lifecycle and conversion operations.
    pub budgets: BudgetLifecycleManager,
    /// Cart to order assembly.
    pub checkout: CheckoutService,
    /// Audit history reader.
    pub audit: AuditLogWriter,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Wires every service over one entity store and notifier.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        notifier: Arc<dyn NotificationSender>,
        jwt_service: JwtService,
        store_config: &StoreConfig,
    ) -> Self {
        Self {
            orders: OrderLifecycleManager::new(store.clone(), notifier.clone()),
            budgets: BudgetLifecycleManager::new(store.clone(), notifier.clone()),
            checkout: CheckoutService::new(store.clone(), notifier, store_config.shipping_cost),
            audit: AuditLogWriter::new(store),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
