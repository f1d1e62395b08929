//! Storefront checkout.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use jardim_core::checkout::CheckoutRequest;
use jardim_core::order::Order;
use jardim_shared::types::ApiResponse;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the checkout routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(place_order))
}

/// POST `/checkout` - Turn the caller's cart into a pending order.
///
/// Anonymous callers reach the service and get its `AUTHENTICATION_REQUIRED`.
async fn place_order(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let customer = auth.map(|user| user.user_id());
    let order = state.checkout.place_order(customer, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}
