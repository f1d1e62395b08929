//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;
pub mod response;

pub use id::*;
pub use money::{Currency, Money, round_money};
pub use pagination::PageRequest;
pub use response::ApiResponse;
