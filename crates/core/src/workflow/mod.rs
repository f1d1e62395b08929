//! Order and budget status workflow.
//!
//! # Modules
//!
//! - `types` - Status enums (`OrderStatus`, `BudgetStatus`)
//! - `transitions` - Immutable transition tables and validation
//! - `error` - Lifecycle error taxonomy

pub mod error;
pub mod transitions;
pub mod types;

#[cfg(test)]
mod transitions_props;

pub use error::LifecycleError;
pub use transitions::{LifecycleStatus, ensure_transition};
pub use types::{BudgetStatus, OrderStatus};
