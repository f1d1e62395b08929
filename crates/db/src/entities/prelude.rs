//! Convenience re-exports of every entity.

pub use super::audit_logs::Entity as AuditLogs;
pub use super::budgets::Entity as Budgets;
pub use super::customers::Entity as Customers;
pub use super::orders::Entity as Orders;
