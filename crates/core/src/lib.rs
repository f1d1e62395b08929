//! Core business logic for the EcoJardim storefront and back-office.
//!
//! This crate contains the order and budget lifecycles with ZERO web or
//! database dependencies. Persistence and email delivery are reached through
//! the [`store::EntityStore`] and [`notify::NotificationSender`] traits.
//!
//! # Modules
//!
//! - `workflow` - Status enums, transition tables, and the error taxonomy
//! - `store` - Entity store contract and the in-memory implementation
//! - `audit` - Append-only audit log writer
//! - `hooks` - Best-effort post-commit hooks
//! - `order` - Order lifecycle manager
//! - `budget` - Budget lifecycle manager and budget-to-order conversion
//! - `checkout` - Cart to order assembly
//! - `notify` - Notification sender contract and email rendering
//! - `customer` - Customer contact records

pub mod audit;
pub mod budget;
pub mod checkout;
pub mod customer;
pub mod hooks;
pub mod notify;
pub mod order;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod testing;
