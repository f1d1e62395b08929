//! Orders and their delivery lifecycle.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::OrderLifecycleManager;
pub use types::{
    LineItem, Order, OrderFilter, OrderPatch, PaymentMethod, PaymentStatus, UserInfo,
    add_amounts, items_subtotal, max_amount, validate_items,
};
