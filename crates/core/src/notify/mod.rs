//! Customer notifications.
//!
//! The lifecycle managers call a [`NotificationSender`] after each commit.
//! Delivery is best-effort: failures are logged by the caller and never
//! undo the state change.

mod email;
pub mod templates;

pub use email::EmailNotifier;

use async_trait::async_trait;
use jardim_shared::types::UserId;
use jardim_shared::{EmailConfig, EmailError, EmailService, StoreConfig};
use std::sync::Arc;
use thiserror::Error;

use crate::budget::Budget;
use crate::order::Order;
use crate::store::{EntityStore, StoreError};
use templates::EmailTemplates;

/// Notification delivery failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The customer has no email address on file.
    #[error("No email address on file for customer {0}")]
    MissingRecipient(UserId),

    /// The recipient lookup failed.
    #[error("Recipient lookup failed: {0}")]
    Lookup(#[from] StoreError),

    /// The message could not be built or sent.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        Self::Delivery(err.to_string())
    }
}

/// Sends customer-facing messages about orders and budgets.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// An order changed status.
    async fn send_order_status_update(&self, order: &Order) -> Result<(), NotifyError>;

    /// A new order was placed.
    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError>;

    /// A budget was created.
    async fn send_budget_notification(&self, budget: &Budget) -> Result<(), NotifyError>;

    /// A budget changed status.
    async fn send_budget_status_update(&self, budget: &Budget) -> Result<(), NotifyError>;
}

/// Logs notifications instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send_order_status_update(&self, order: &Order) -> Result<(), NotifyError> {
        tracing::info!(order_id = %order.id, status = %order.status, "Order status notification (not sent)");
        Ok(())
    }

    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        tracing::info!(order_id = %order.id, total = %order.total, "Order confirmation (not sent)");
        Ok(())
    }

    async fn send_budget_notification(&self, budget: &Budget) -> Result<(), NotifyError> {
        tracing::info!(budget_id = %budget.id, customer_id = %budget.customer_id, "Budget notification (not sent)");
        Ok(())
    }

    async fn send_budget_status_update(&self, budget: &Budget) -> Result<(), NotifyError> {
        tracing::info!(budget_id = %budget.id, status = %budget.status, "Budget status notification (not sent)");
        Ok(())
    }
}

/// Returns an [`EmailNotifier`] when `email.enabled`, otherwise a [`LogNotifier`].
pub fn sender_from_config(
    email: &EmailConfig,
    store_config: &StoreConfig,
    store: Arc<dyn EntityStore>,
) -> Arc<dyn NotificationSender> {
    if !email.enabled {
        tracing::info!("Email notifications disabled; logging instead");
        return Arc::new(LogNotifier);
    }

    tracing::info!(
        smtp_host = %email.smtp_host,
        smtp_port = %email.smtp_port,
        "Email notifications enabled"
    );
    Arc::new(EmailNotifier::new(
        EmailService::new(email.clone()),
        store,
        EmailTemplates::new(&store_config.company_name, store_config.currency),
    ))
}
