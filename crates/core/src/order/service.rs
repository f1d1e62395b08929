//! Order lifecycle manager.

use chrono::Utc;
use jardim_shared::types::{OrderId, PageRequest, UserId};
use serde_json::json;
use std::sync::Arc;

use super::types::{Order, OrderFilter, OrderPatch};
use crate::audit::AuditLogWriter;
use crate::hooks::run_best_effort;
use crate::notify::NotificationSender;
use crate::store::{self, EntityStore, Query, Table};
use crate::workflow::{LifecycleError, OrderStatus, ensure_transition};

const ENTITY: &str = "Order";

/// Validates and applies order status transitions.
///
/// Every operation follows the same ordering: persist, then audit, then
/// notify. Only the persistence step decides the result.
#[derive(Clone)]
pub struct OrderLifecycleManager {
    store: Arc<dyn EntityStore>,
    audit: AuditLogWriter,
    notifier: Arc<dyn NotificationSender>,
}

impl OrderLifecycleManager {
    /// Creates a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            audit: AuditLogWriter::new(store.clone()),
            store,
            notifier,
        }
    }

    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, LifecycleError> {
        store::fetch(self.store.as_ref(), Table::Orders, id.into_inner())
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the store query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Vec<Order>, LifecycleError> {
        let mut query = Query::new();
        if let Some(status) = filter.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(user_id) = filter.user_id {
            query = query.eq("user_id", user_id.into_inner());
        }
        if let Some(from) = filter.created_from {
            query = query.gte("created_at", from);
        }
        if let Some(to) = filter.created_to {
            query = query.lte("created_at", to);
        }
        let query = query
            .order_by_desc("created_at")
            .range(page.offset(), page.limit());

        Ok(store::search(self.store.as_ref(), Table::Orders, &query).await?)
    }

    /// Moves an order to `requested` if the transition table allows it.
    ///
    /// The audit entry and the status email are best-effort: once the new
    /// status is stored the call succeeds even if either fails.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist
    /// - `InvalidTransition` if `requested` is not reachable from the current status
    /// - `Persistence` if the store rejects the write
    pub async fn update_status(
        &self,
        id: OrderId,
        requested: OrderStatus,
        actor: UserId,
    ) -> Result<Order, LifecycleError> {
        let current = self.get(id).await?;
        ensure_transition(current.status, requested)?;

        let updated: Order = store::patch(
            self.store.as_ref(),
            Table::Orders,
            id.into_inner(),
            json!({ "status": requested, "updated_at": Utc::now() }),
        )
        .await
        .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;

        run_best_effort(
            "order_status_audit",
            self.audit.record_status_change(
                Table::Orders,
                id.into_inner(),
                current.status.as_str(),
                requested.as_str(),
                actor,
            ),
        )
        .await;
        run_best_effort(
            "order_status_notification",
            self.notifier.send_order_status_update(&updated),
        )
        .await;

        tracing::info!(
            order_id = %id,
            from = %current.status,
            to = %requested,
            actor = %actor,
            "Order status updated"
        );
        Ok(updated)
    }

    /// Edits non-status fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, `Persistence` on store failure.
    pub async fn update_details(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Order, LifecycleError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut changes = serde_json::to_value(patch)
            .map_err(|e| LifecycleError::Persistence(e.to_string()))?;
        if let Some(fields) = changes.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }

        let updated = store::patch(self.store.as_ref(), Table::Orders, id.into_inner(), changes)
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;
        tracing::info!(order_id = %id, "Order details updated");
        Ok(updated)
    }

    /// Deletes an order. Administrative escape hatch outside the workflow.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, `Persistence` on store failure.
    pub async fn delete(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.store
            .delete(Table::Orders, id.into_inner())
            .await
            .map_err(|e| LifecycleError::from_lookup(ENTITY, e))?;
        tracing::warn!(order_id = %id, "Order deleted");
        Ok(())
    }
}
