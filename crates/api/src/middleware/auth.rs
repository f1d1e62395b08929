//! Authentication middleware and extractors.
//!
//! The middleware never rejects a request for lacking a token; handlers
//! decide with [`AuthUser`] (required) or `Option<AuthUser>` (checkout,
//! which reports its own `AUTHENTICATION_REQUIRED`). A token that is
//! present but invalid is always rejected.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jardim_shared::types::UserId;
use jardim_shared::{Claims, JwtError, Role};
use std::convert::Infallible;

use crate::{ApiError, AppState};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates a bearer token when one is sent and stores its claims in the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return next.run(request).await;
    };

    let Some(token) = header.to_str().ok().and_then(extract_bearer_token) else {
        return ApiError::unauthorized("Authorization header must carry a Bearer token")
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => ApiError::unauthorized("Token has expired").into_response(),
        Err(_) => ApiError::unauthorized("Invalid or malformed token").into_response(),
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.user_id())
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }

    /// Returns true for employees and administrators.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.0.is_staff()
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }

    /// Fails unless the caller is an employee or administrator.
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Employee or admin role required"))
        }
    }

    /// Fails unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role() == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }

    /// Fails unless the caller is staff or is `owner`.
    pub fn require_staff_or(&self, owner: UserId) -> Result<(), ApiError> {
        if self.is_staff() || self.user_id() == owner {
            Ok(())
        } else {
            Err(ApiError::forbidden("You do not have access to this resource"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Claims>().cloned().map(AuthUser))
    }
}
