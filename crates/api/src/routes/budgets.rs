//! Budget (quotation) routes for the employee console.
//!
//! Customers may list and read their own budgets; every mutation is staff-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use jardim_core::budget::{
    Budget, BudgetFilter, BudgetPatch, ConvertBudgetInput, CreateBudgetInput,
};
use jardim_core::order::Order;
use jardim_core::workflow::BudgetStatus;
use jardim_shared::types::{ApiResponse, BudgetId, PageRequest, UserId};
use serde::Deserialize;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/expire", post(expire_budgets))
        .route(
            "/budgets/{budget_id}",
            get(get_budget).patch(update_budget).delete(delete_budget),
        )
        .route("/budgets/{budget_id}/status", post(update_budget_status))
        .route("/budgets/{budget_id}/convert", post(convert_budget))
}

/// Query string for `GET /budgets`.
#[derive(Debug, Default, Deserialize)]
pub struct ListBudgetsQuery {
    /// Only this customer (ignored for customers).
    pub customer_id: Option<UserId>,
    /// Only this status.
    pub status: Option<BudgetStatus>,
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Body of `POST /budgets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetStatusRequest {
    /// Requested status.
    pub status: BudgetStatus,
}

/// GET `/budgets`
async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListBudgetsQuery>,
) -> Result<Json<ApiResponse<Vec<Budget>>>, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        params.page.unwrap_or(defaults.page),
        params.per_page.unwrap_or(defaults.per_page),
    );
    let filter = BudgetFilter {
        customer_id: if auth.is_staff() {
            params.customer_id
        } else {
            Some(auth.user_id())
        },
        status: params.status,
    };

    let budgets = state.budgets.list(&filter, page).await?;
    Ok(Json(ApiResponse::ok(budgets)))
}

/// POST `/budgets` - Prepare a draft budget for a customer.
async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBudgetInput>,
) -> Result<(StatusCode, Json<ApiResponse<Budget>>), ApiError> {
    auth.require_staff()?;
    let budget = state.budgets.create(input, auth.user_id()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(budget))))
}

/// GET `/budgets/{budget_id}` - Staff or the budget's customer.
async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<ApiResponse<Budget>>, ApiError> {
    let budget = state.budgets.get(budget_id).await?;
    auth.require_staff_or(budget.customer_id)?;
    Ok(Json(ApiResponse::ok(budget)))
}

/// PATCH `/budgets/{budget_id}` - Edit notes or the expiry date.
async fn update_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Json(patch): Json<BudgetPatch>,
) -> Result<Json<ApiResponse<Budget>>, ApiError> {
    auth.require_staff()?;
    let budget = state.budgets.update_details(budget_id, &patch).await?;
    Ok(Json(ApiResponse::ok(budget)))
}

/// DELETE `/budgets/{budget_id}`
async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, ApiError> {
    auth.require_staff()?;
    state.budgets.delete(budget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/budgets/{budget_id}/status`
async fn update_budget_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Json(payload): Json<UpdateBudgetStatusRequest>,
) -> Result<Json<ApiResponse<Budget>>, ApiError> {
    auth.require_staff()?;
    let budget = state
        .budgets
        .update_status(budget_id, payload.status, auth.user_id())
        .await?;
    Ok(Json(ApiResponse::ok(budget)))
}

/// POST `/budgets/{budget_id}/convert` - Turn an accepted budget into an order.
///
/// Repeating the call returns the order created the first time.
async fn convert_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Json(input): Json<ConvertBudgetInput>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    auth.require_staff()?;
    let order = state
        .budgets
        .convert_to_order(budget_id, input, auth.user_id())
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// POST `/budgets/expire` - Expire every draft or sent budget past its date.
async fn expire_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Budget>>>, ApiError> {
    auth.require_staff()?;
    let expired = state
        .budgets
        .expire_stale(Utc::now(), auth.user_id())
        .await?;
    Ok(Json(ApiResponse::ok(expired)))
}
