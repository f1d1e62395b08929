//! Error envelope returned by every handler.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jardim_core::store::StoreError;
use jardim_core::workflow::LifecycleError;
use jardim_shared::AppError;
use jardim_shared::types::ApiResponse;
use thiserror::Error;

/// Any failure a handler can report.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A domain operation failed; its message is shown verbatim.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Authentication, authorization or request-level failure.
    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    /// Caller is not authenticated.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::App(AppError::Unauthorized(message.into()))
    }

    /// Caller lacks the required role or ownership.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::App(AppError::Forbidden(message.into()))
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Lifecycle(err) => err.status_code(),
            Self::App(err) => err.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Lifecycle(err) => err.error_code(),
            Self::App(err) => err.error_code(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Lifecycle(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }
        let body = ApiResponse::<()>::failure(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
