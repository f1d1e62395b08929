//! Budgets (price quotations) and their conversion into orders.

mod conversion;
pub mod service;
pub mod types;


pub use service::BudgetLifecycleManager;
pub use types::{Budget, BudgetFilter, BudgetPatch, ConvertBudgetInput, CreateBudgetInput};
