//! Audit history for the employee console.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use jardim_core::audit::AuditLogEntry;
use jardim_shared::types::ApiResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the audit log routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit-logs", get(record_history))
}

/// Query string for `GET /audit-logs`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Logical table (`orders`, `budgets`, `budgets_to_orders`).
    pub table: String,
    /// Record id.
    pub record_id: Uuid,
}

/// GET `/audit-logs?table=&record_id=` - Oldest first. Staff only.
async fn record_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>, ApiError> {
    auth.require_staff()?;
    let entries = state.audit.history(&params.table, params.record_id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}
