//! `SeaORM` entity definitions.
//!
//! Column names match the JSON keys of the core domain records, so a model
//! serializes straight into an `EntityStore` record and back.

pub mod prelude;

pub mod audit_logs;
pub mod budgets;
pub mod customers;
pub mod orders;
