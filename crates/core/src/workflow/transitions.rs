//! Transition tables for orders and budgets.
//!
//! Each table maps a current status to the statuses it may move to. Terminal
//! statuses list only themselves, so re-applying a terminal status is an
//! accepted no-op and every other target is rejected.

use crate::workflow::error::LifecycleError;
use crate::workflow::types::{BudgetStatus, OrderStatus};

/// A status governed by a transition table.
pub trait LifecycleStatus: Copy + Eq + std::fmt::Display + 'static {
    /// Statuses reachable in one step from `self`.
    fn allowed_next(self) -> &'static [Self];

    /// Returns true if `self -> next` is an edge of the table.
    fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Returns true if the status accepts no transition but to itself.
    fn is_terminal(self) -> bool {
        self.allowed_next() == [self]
    }
}

impl LifecycleStatus for OrderStatus {
    fn allowed_next(self) -> &'static [Self] {
        use OrderStatus::{
            Cancelled, Confirmed, Delivered, Pending, Processing, Quotation, Quoted, Ready,
            Rejected, Shipped,
        };
        match self {
            Pending => &[Quotation, Confirmed, Cancelled],
            Quotation => &[Quoted, Rejected, Cancelled],
            Quoted => &[Confirmed, Rejected, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Ready, Cancelled],
            Ready => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered => &[Delivered],
            Cancelled => &[Cancelled],
            Rejected => &[Rejected],
        }
    }
}

impl LifecycleStatus for BudgetStatus {
    fn allowed_next(self) -> &'static [Self] {
        use BudgetStatus::{Accepted, Draft, Expired, Rejected, Sent};
        match self {
            Draft => &[Sent, Expired],
            Sent => &[Accepted, Rejected, Expired],
            Accepted => &[Accepted],
            Rejected => &[Rejected],
            Expired => &[Expired],
        }
    }
}

/// Checks `from -> to` against the table.
///
/// # Errors
///
/// Returns `InvalidTransition` naming both statuses when the edge is absent.
pub fn ensure_transition<S: LifecycleStatus>(from: S, to: S) -> Result<(), LifecycleError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
