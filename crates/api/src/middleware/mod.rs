//! Request middleware and auth extractors.

pub mod auth;

pub use auth::{AuthUser, auth_middleware};
