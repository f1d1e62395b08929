//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod audit_logs;
pub mod budgets;
pub mod checkout;
pub mod health;
pub mod orders;

/// Creates the API router. Everything except the health check passes
/// through the auth middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let authenticated_routes = Router::new()
        .merge(checkout::routes())
        .merge(orders::routes())
        .merge(budgets::routes())
        .merge(audit_logs::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(authenticated_routes)
}
