use async_trait::async_trait;
use jardim_shared::EmailService;
use jardim_shared::types::UserId;
use std::sync::Arc;

use super::templates::{EmailTemplates, RenderedEmail};
use super::{NotificationSender, NotifyError};
use crate::budget::Budget;
use crate::customer::Customer;
use crate::order::Order;
use crate::store::{self, EntityStore, StoreError, Table};

/// Sends notifications over SMTP.
///
/// Order emails go to the address captured at checkout. Budget emails are
/// addressed to the customer record the budget belongs to.
#[derive(Clone)]
pub struct EmailNotifier {
    email: EmailService,
    store: Arc<dyn EntityStore>,
    templates: EmailTemplates,
}

impl EmailNotifier {
    /// Creates a notifier.
    #[must_use]
    pub fn new(email: EmailService, store: Arc<dyn EntityStore>, templates: EmailTemplates) -> Self {
        Self {
            email,
            store,
            templates,
        }
    }

    async fn customer(&self, customer_id: UserId) -> Result<Customer, NotifyError> {
        match store::fetch::<Customer>(self.store.as_ref(), Table::Customers, customer_id.into_inner())
            .await
        {
            Ok(customer) => Ok(customer),
            Err(StoreError::NotFound { .. }) => Err(NotifyError::MissingRecipient(customer_id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn deliver(&self, to: &str, message: RenderedEmail) -> Result<(), NotifyError> {
        self.email
            .send_email(to, &message.subject, &message.body)
            .await?;
        tracing::debug!(to, subject = %message.subject, "Email sent");
        Ok(())
    }

    async fn deliver_to_customer(
        &self,
        customer_id: UserId,
        render: impl FnOnce(&str) -> RenderedEmail + Send,
    ) -> Result<(), NotifyError> {
        let customer = self.customer(customer_id).await?;
        let to = customer
            .contact_email()
            .ok_or(NotifyError::MissingRecipient(customer_id))?;
        let message = render(&customer.name);
        self.deliver(to, message).await
    }
}

#[async_trait]
impl NotificationSender for EmailNotifier {
    async fn send_order_status_update(&self, order: &Order) -> Result<(), NotifyError> {
        let message = self.templates.order_status_update(order);
        self.deliver(&order.user_info.email, message).await
    }

    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        let message = self.templates.order_confirmation(order);
        self.deliver(&order.user_info.email, message).await
    }

    async fn send_budget_notification(&self, budget: &Budget) -> Result<(), NotifyError> {
        self.deliver_to_customer(budget.customer_id, |name| {
            self.templates.budget_notification(budget, name)
        })
        .await
    }

    async fn send_budget_status_update(&self, budget: &Budget) -> Result<(), NotifyError> {
        self.deliver_to_customer(budget.customer_id, |name| {
            self.templates.budget_status_update(budget, name)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::sample_budget;
    use crate::workflow::BudgetStatus;
    use jardim_shared::EmailConfig;
    use jardim_shared::types::Currency;

    fn notifier(store: Arc<MemoryStore>) -> EmailNotifier {
        EmailNotifier::new(
            EmailService::new(EmailConfig::default()),
            store,
            EmailTemplates::new("EcoJardim", Currency::Brl),
        )
    }

    #[tokio::test]
    async fn test_budget_email_without_customer_is_missing_recipient() {
        let store = Arc::new(MemoryStore::new());
        let budget = sample_budget(BudgetStatus::Sent);

        let err = notifier(store)
            .send_budget_status_update(&budget)
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::MissingRecipient(id) if id == budget.customer_id));
    }

    #[tokio::test]
    async fn test_budget_email_with_blank_address_is_missing_recipient() {
        let store = Arc::new(MemoryStore::new());
        let budget = sample_budget(BudgetStatus::Sent);
        let customer = Customer {
            id: budget.customer_id,
            name: "João".to_string(),
            email: Some("  ".to_string()),
            phone: None,
        };
        store::create(store.as_ref(), Table::Customers, &customer)
            .await
            .unwrap();

        let err = notifier(store)
            .send_budget_notification(&budget)
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::MissingRecipient(_)));
    }
}
