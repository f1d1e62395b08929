//! Shared types, errors, and configuration for the EcoJardim backend.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination and response envelope types
//! - Application-wide error types
//! - Configuration management
//! - JWT validation and SMTP email transport

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, Role};
pub use config::{AppConfig, EmailConfig, JwtConfig, StoreConfig};
pub use email::{EmailError, EmailService};
pub use error::AppError;
pub use jwt::{JwtError, JwtService};
