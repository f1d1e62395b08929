//! Budget to order conversion.
//!
//! Conversion is a compensating sequence, not a transaction: the order is
//! created first and the budget is linked afterwards. A failed order insert
//! leaves the budget untouched. A failed link surfaces as
//! `PartialConversion`, and retrying reuses the order already created.

use chrono::Utc;
use jardim_shared::types::{BudgetId, OrderId, UserId};
use serde_json::json;
use validator::Validate;

use super::service::BudgetLifecycleManager;
use super::types::{Budget, ConvertBudgetInput};
use crate::hooks::run_best_effort;
use crate::order::{Order, PaymentStatus};
use crate::store::{self, Query, Table};
use crate::workflow::{BudgetStatus, LifecycleError, OrderStatus};

impl BudgetLifecycleManager {
    /// Turns an accepted budget into a confirmed order.
    ///
    /// The order copies the budget's items and total, starts in
    /// `confirmed` and points back to the budget. A budget that already
    /// has an `order_id` returns that order without writing anything.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the budget (or its linked order) does not exist
    /// - `InvalidState` if the budget is not accepted
    /// - `Validation` if `user_info` is invalid
    /// - `Persistence` if the order cannot be created (budget unchanged)
    /// - `PartialConversion` if the order exists but the budget could not be linked
    pub async fn convert_to_order(
        &self,
        id: BudgetId,
        input: ConvertBudgetInput,
        actor: UserId,
    ) -> Result<Order, LifecycleError> {
        let budget = self.get(id).await?;

        if let Some(order_id) = budget.order_id {
            tracing::info!(budget_id = %id, order_id = %order_id, "Budget already converted");
            return store::fetch(self.store.as_ref(), Table::Orders, order_id.into_inner())
                .await
                .map_err(|e| LifecycleError::from_lookup("Order", e));
        }

        if budget.status != BudgetStatus::Accepted {
            return Err(LifecycleError::InvalidState(
                "Only accepted budgets can be converted to orders".to_string(),
            ));
        }
        input.user_info.validate()?;

        let order = match self.find_converted_order(id).await? {
            Some(order) => {
                tracing::warn!(
                    budget_id = %id,
                    order_id = %order.id,
                    "Reusing order from an earlier incomplete conversion"
                );
                order
            }
            None => {
                let order = Self::build_order(&budget, input);
                store::create(self.store.as_ref(), Table::Orders, &order).await?
            }
        };

        self.link_order(&budget, order.id, actor).await?;

        run_best_effort(
            "budget_conversion_audit",
            self.audit.record_conversion(id, order.id, actor),
        )
        .await;

        tracing::info!(
            budget_id = %id,
            order_id = %order.id,
            actor = %actor,
            "Budget converted to order"
        );
        Ok(order)
    }

    async fn find_converted_order(&self, id: BudgetId) -> Result<Option<Order>, LifecycleError> {
        let query = Query::new()
            .eq("budget_id", id.into_inner())
            .order_by_asc("created_at")
            .range(0, 1);
        let orders: Vec<Order> = store::search(self.store.as_ref(), Table::Orders, &query).await?;
        Ok(orders.into_iter().next())
    }

    fn build_order(budget: &Budget, input: ConvertBudgetInput) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            user_id: input.customer_id,
            items: budget.items.clone(),
            total: budget.total,
            status: OrderStatus::Confirmed,
            date: now,
            budget_id: Some(budget.id),
            payment_status: Some(PaymentStatus::Pending),
            payment_method: Some(input.user_info.payment_method),
            delivery_address: Some(input.user_info.delivery_address()),
            delivery_date: None,
            notes: budget.notes.clone(),
            user_info: input.user_info,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stamps `order_id` on the budget and records the link.
    async fn link_order(
        &self,
        budget: &Budget,
        order_id: OrderId,
        actor: UserId,
    ) -> Result<(), LifecycleError> {
        self.store
            .update(
                Table::Budgets,
                budget.id.into_inner(),
                json!({ "order_id": order_id, "updated_at": Utc::now() }),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    budget_id = %budget.id,
                    order_id = %order_id,
                    error = %e,
                    "Order created but budget link failed"
                );
                LifecycleError::PartialConversion {
                    budget_id: budget.id.into_inner(),
                    order_id: order_id.into_inner(),
                    reason: e.to_string(),
                }
            })?;

        run_best_effort(
            "budget_link_audit",
            self.audit.record_change(
                Table::Budgets,
                budget.id.into_inner(),
                json!({ "order_id": null }),
                json!({ "order_id": order_id }),
                actor,
            ),
        )
        .await;
        Ok(())
    }
}
