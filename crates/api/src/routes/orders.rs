//! Order routes for the employee console and the customer's order history.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use jardim_core::order::{Order, OrderFilter, OrderPatch};
use jardim_core::workflow::OrderStatus;
use jardim_shared::types::{ApiResponse, OrderId, PageRequest, UserId};
use serde::Deserialize;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route(
            "/orders/{order_id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/orders/{order_id}/status", post(update_order_status))
}

/// Query string for `GET /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Only this status.
    pub status: Option<OrderStatus>,
    /// Only this customer (ignored for customers, who always see their own).
    pub user_id: Option<UserId>,
    /// Created at or after.
    pub created_from: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_to: Option<DateTime<Utc>>,
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Body of `POST /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    /// Requested status.
    pub status: OrderStatus,
}

/// GET `/orders` - Staff see every order; customers see their own.
async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        params.page.unwrap_or(defaults.page),
        params.per_page.unwrap_or(defaults.per_page),
    );
    let filter = OrderFilter {
        status: params.status,
        user_id: if auth.is_staff() {
            params.user_id
        } else {
            Some(auth.user_id())
        },
        created_from: params.created_from,
        created_to: params.created_to,
    };

    let orders = state.orders.list(&filter, page).await?;
    Ok(Json(ApiResponse::ok(orders)))
}

/// GET `/orders/{order_id}` - Staff or the order's owner.
async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order = state.orders.get(order_id).await?;
    auth.require_staff_or(order.user_id)?;
    Ok(Json(ApiResponse::ok(order)))
}

/// PATCH `/orders/{order_id}` - Edit payment, delivery or notes. Staff only.
async fn update_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    auth.require_staff()?;
    let order = state.orders.update_details(order_id, &patch).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// DELETE `/orders/{order_id}` - Admin only.
async fn delete_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    state.orders.delete(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/orders/{order_id}/status` - Apply a status transition. Staff only.
async fn update_order_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    auth.require_staff()?;
    let order = state
        .orders
        .update_status(order_id, payload.status, auth.user_id())
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}
