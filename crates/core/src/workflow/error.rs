//! Error taxonomy shared by every lifecycle operation.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Errors returned by the order, budget and checkout operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The referenced order or budget does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind ("Order", "Budget").
        entity: &'static str,
        /// Missing id.
        id: Uuid,
    },

    /// The requested status is not reachable from the current one.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// An operation's precondition on the entity state does not hold.
    #[error("{0}")]
    InvalidState(String),

    /// The store rejected a read or write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Checkout was attempted with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout was attempted without an authenticated customer.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order was created but the budget could not be linked to it.
    #[error("Order {order_id} was created but budget {budget_id} could not be linked: {reason}")]
    PartialConversion {
        /// Source budget.
        budget_id: Uuid,
        /// Order that now exists.
        order_id: Uuid,
        /// Underlying store failure.
        reason: String,
    },
}

impl LifecycleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptyCart | Self::Validation(_) => 400,
            Self::AuthenticationRequired => 401,
            Self::NotFound { .. } => 404,
            Self::InvalidTransition { .. } | Self::InvalidState(_) => 409,
            Self::Persistence(_) | Self::PartialConversion { .. } => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::EmptyCart => "EMPTY_CART",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PartialConversion { .. } => "PARTIAL_CONVERSION",
        }
    }

    /// Maps a store failure on a single-entity lookup, turning `NotFound`
    /// into the entity-level variant.
    pub(crate) fn from_lookup(entity: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound { entity, id },
            other => other.into(),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => Self::NotFound {
                entity: table.as_str(),
                id,
            },
            other => Self::Persistence(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for LifecycleError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Table;

    #[test]
    fn test_invalid_transition_error() {
        let err = LifecycleError::InvalidTransition {
            from: "pending".to_string(),
            to: "delivered".to_string(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid status transition from pending to delivered"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = LifecycleError::NotFound {
            entity: "Order",
            id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(
            err.to_string(),
            "Order 00000000-0000-0000-0000-000000000000 not found"
        );
    }

    #[test]
    fn test_checkout_errors() {
        assert_eq!(LifecycleError::EmptyCart.status_code(), 400);
        assert_eq!(LifecycleError::EmptyCart.error_code(), "EMPTY_CART");
        assert_eq!(LifecycleError::AuthenticationRequired.status_code(), 401);
        assert_eq!(
            LifecycleError::Validation("quantity".into()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_from_store_error() {
        let err: LifecycleError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, LifecycleError::Persistence(ref msg) if msg.contains("connection reset")));
        assert_eq!(err.status_code(), 500);

        let err = LifecycleError::from_lookup(
            "Budget",
            StoreError::NotFound {
                table: Table::Budgets,
                id: Uuid::nil(),
            },
        );
        assert!(matches!(err, LifecycleError::NotFound { entity: "Budget", .. }));
    }

    #[test]
    fn test_partial_conversion_error() {
        let err = LifecycleError::PartialConversion {
            budget_id: Uuid::nil(),
            order_id: Uuid::nil(),
            reason: "timeout".into(),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "PARTIAL_CONVERSION");
    }
}
