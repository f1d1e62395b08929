//! Budget lifecycle manager.

use chrono::{DateTime, Utc};
use jardim_shared::types::{BudgetId, PageRequest, UserId, round_money};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::types::{Budget, BudgetFilter, BudgetPatch, CreateBudgetInput};
use crate::audit::AuditLogWriter;
use crate::customer::{self, CustomerDetails};
use crate::hooks::run_best_effort;
use crate::notify::NotificationSender;
use crate::order::{add_amounts, items_subtotal, validate_items};
use crate::store::{self, EntityStore, Query, StoreError, Table};
use crate::workflow::{BudgetStatus, LifecycleError, ensure_transition};

const ENTITY: &str = "Budget";

/// Validates and applies budget status transitions, and converts accepted
/// budgets into orders (see `conversion`).
#[derive(Clone)]
pub struct BudgetLifecycleManager {
    pub(super) store: Arc<dyn EntityStore>,
    pub(super) audit: AuditLogWriter,
    notifier: Arc<dyn NotificationSender>,
}

impl BudgetLifecycleManager {
    /// Creates a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            audit: AuditLogWriter::new(store.clone()),
            store,
            notifier,
        }
    }

    /// Creates a draft budget prepared by `actor`.
    ///
    /// `subtotal` is the sum of line totals and `total` adds the tax.
    ///
    /// # Errors
    ///
    /// - `Validation` if there are no items, an item is invalid, the tax is negative,
    ///   an amount is out of range, or the customer is unknown and no details were given
    /// - `Persistence` if the store rejects the insert
    pub async fn create(
        &self,
        input: CreateBudgetInput,
        actor: UserId,
    ) -> Result<Budget, LifecycleError> {
        if input.items.is_empty() {
            return Err(LifecycleError::Validation(
                "budget must contain at least one item".to_string(),
            ));
        }
        validate_items(&input.items)?;
        let tax = input.tax.map(round_money);
        if tax.is_some_and(|t| t < Decimal::ZERO) {
            return Err(LifecycleError::Validation(
                "tax must not be negative".to_string(),
            ));
        }

        let subtotal = items_subtotal(&input.items)?;
        let total = add_amounts(subtotal, tax.unwrap_or(Decimal::ZERO))?;
        self.ensure_customer(input.customer_id, input.customer.as_ref())
            .await?;

        let now = Utc::now();
        let budget = Budget {
            id: BudgetId::new(),
            customer_id: input.customer_id,
            items: input.items,
            subtotal,
            tax,
            total,
            status: BudgetStatus::Draft,
            valid_until: input.valid_until,
            order_id: None,
            notes: input.notes,
            created_by: actor,
            created_at: now,
            updated_at: now,
        };

        let budget = store::create(self.store.as_ref(), Table::Budgets, &budget).await?;
        run_best_effort(
            "budget_created_notification",
            self.notifier.send_budget_notification(&budget),
        )
        .await;

        tracing::info!(
            budget_id = %budget.id,
            customer_id = %budget.customer_id,
            total = %budget.total,
            "Budget created"
        );
        Ok(budget)
    }

    async fn ensure_customer(
        &self,
        id: UserId,
        details: Option<&CustomerDetails>,
    ) -> Result<(), LifecycleError> {
        if let Some(details) = details {
            details.validate()?;
            customer::register(self.store.as_ref(), id, details).await?;
            return Ok(());
        }
        match self.store.get(Table::Customers, id.into_inner()).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(LifecycleError::Validation(format!(
                "customer {id} is not registered; include customer details"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches one budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist.
    pub async fn get(&self, id: BudgetId) -> Result<Budget, LifecycleError> {
        store::fetch(self.store.as_ref(), Table::Budgets, id.into_inner())
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))
    }

    /// Lists budgets, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the store query fails.
    pub async fn list(
        &self,
        filter: &BudgetFilter,
        page: PageRequest,
    ) -> Result<Vec<Budget>, LifecycleError> {
        let mut query = Query::new();
        if let Some(customer_id) = filter.customer_id {
            query = query.eq("customer_id", customer_id.into_inner());
        }
        if let Some(status) = filter.status {
            query = query.eq("status", status.as_str());
        }
        let query = query
            .order_by_desc("created_at")
            .range(page.offset(), page.limit());

        Ok(store::search(self.store.as_ref(), Table::Budgets, &query).await?)
    }

    /// Moves a budget to `requested` if the transition table allows it.
    ///
    /// Same contract as the order operation: persist, then best-effort
    /// audit and status email.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the budget does not exist
    /// - `InvalidTransition` if `requested` is not reachable from the current status
    /// - `Persistence` if the store rejects the write
    pub async fn update_status(
        &self,
        id: BudgetId,
        requested: BudgetStatus,
        actor: UserId,
    ) -> Result<Budget, LifecycleError> {
        let current = self.get(id).await?;
        ensure_transition(current.status, requested)?;

        let updated: Budget = store::patch(
            self.store.as_ref(),
            Table::Budgets,
            id.into_inner(),
            json!({ "status": requested, "updated_at": Utc::now() }),
        )
        .await
        .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;

        run_best_effort(
            "budget_status_audit",
            self.audit.record_status_change(
                Table::Budgets,
                id.into_inner(),
                current.status.as_str(),
                requested.as_str(),
                actor,
            ),
        )
        .await;
        run_best_effort(
            "budget_status_notification",
            self.notifier.send_budget_status_update(&updated),
        )
        .await;

        tracing::info!(
            budget_id = %id,
            from = %current.status,
            to = %requested,
            actor = %actor,
            "Budget status updated"
        );
        Ok(updated)
    }

    /// Edits notes or the expiry date.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist, `Persistence` on store failure.
    pub async fn update_details(
        &self,
        id: BudgetId,
        patch: &BudgetPatch,
    ) -> Result<Budget, LifecycleError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut changes = serde_json::to_value(patch)
            .map_err(|e| LifecycleError::Persistence(e.to_string()))?;
        if let Some(fields) = changes.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }

        let updated = store::patch(self.store.as_ref(), Table::Budgets, id.into_inner(), changes)
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;
        tracing::info!(budget_id = %id, "Budget details updated");
        Ok(updated)
    }

    /// Deletes a budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist, `Persistence` on store failure.
    pub async fn delete(&self, id: BudgetId) -> Result<(), LifecycleError> {
        self.store
            .delete(Table::Budgets, id.into_inner())
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;
        tracing::warn!(budget_id = %id, "Budget deleted");
        Ok(())
    }

    /// Expires every draft or sent budget whose `valid_until` is before `now`.
    ///
    /// Each budget goes through [`Self::update_status`], so each gets one
    /// audit entry and a status email. Accepted, rejected and already
    /// expired budgets are never selected, which makes re-running a no-op.
    /// A budget that fails to expire is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the selection query fails.
    pub async fn expire_stale(
        &self,
        now: DateTime<Utc>,
        actor: UserId,
    ) -> Result<Vec<Budget>, LifecycleError> {
        let expirable = BudgetStatus::ALL
            .into_iter()
            .filter(BudgetStatus::can_expire)
            .map(|status| status.as_str());
        let query = Query::new()
            .lt("valid_until", now)
            .is_in("status", expirable)
            .order_by_asc("valid_until");
        let stale: Vec<Budget> = store::search(self.store.as_ref(), Table::Budgets, &query).await?;

        let mut expired = Vec::with_capacity(stale.len());
        for budget in stale {
            match self.update_status(budget.id, BudgetStatus::Expired, actor).await {
                Ok(updated) => expired.push(updated),
                Err(err) => {
                    tracing::warn!(budget_id = %budget.id, error = %err, "Failed to expire budget");
                }
            }
        }

        tracing::info!(count = expired.len(), "Stale budgets expired");
        Ok(expired)
    }
}
