//! Append-only audit log.
//!
//! Entries carry only the changed fields, not full snapshots. This module
//! never updates or deletes an entry.

use chrono::{DateTime, Utc};
use jardim_shared::types::{AuditLogId, BudgetId, OrderId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{self, EntityStore, Query, StoreError, Table};

/// Logical table name of conversion entries.
pub const CONVERSION_TABLE: &str = "budgets_to_orders";

/// Kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// A field change, usually a status transition.
    Update,
    /// A budget produced an order.
    Conversion,
}

/// One immutable audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry id.
    pub id: AuditLogId,
    /// Logical entity kind (`orders`, `budgets`, `budgets_to_orders`).
    pub table_name: String,
    /// Id of the changed record.
    pub record_id: Uuid,
    /// Kind of change.
    pub action: AuditAction,
    /// Changed fields before.
    pub old_data: Value,
    /// Changed fields after.
    pub new_data: Value,
    /// Acting user.
    pub changed_by: UserId,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

/// Writes and reads audit entries through the entity store.
#[derive(Clone)]
pub struct AuditLogWriter {
    store: Arc<dyn EntityStore>,
}

impl AuditLogWriter {
    /// Creates a writer over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn append(
        &self,
        table_name: &str,
        record_id: Uuid,
        action: AuditAction,
        old_data: Value,
        new_data: Value,
        changed_by: UserId,
    ) -> Result<AuditLogEntry, StoreError> {
        let entry = AuditLogEntry {
            id: AuditLogId::new(),
            table_name: table_name.to_string(),
            record_id,
            action,
            old_data,
            new_data,
            changed_by,
            created_at: Utc::now(),
        };
        store::create(self.store.as_ref(), Table::AuditLogs, &entry).await
    }

    /// Records `from -> to` on the `status` field of a record.
    ///
    /// # Errors
    ///
    /// Returns the store error if the entry cannot be written.
    pub async fn record_status_change(
        &self,
        table: Table,
        record_id: Uuid,
        from: &str,
        to: &str,
        changed_by: UserId,
    ) -> Result<AuditLogEntry, StoreError> {
        self.append(
            table.as_str(),
            record_id,
            AuditAction::Update,
            json!({ "status": from }),
            json!({ "status": to }),
            changed_by,
        )
        .await
    }

    /// Records an arbitrary field change.
    ///
    /// # Errors
    ///
    /// Returns the store error if the entry cannot be written.
    pub async fn record_change(
        &self,
        table: Table,
        record_id: Uuid,
        old_data: Value,
        new_data: Value,
        changed_by: UserId,
    ) -> Result<AuditLogEntry, StoreError> {
        self.append(
            table.as_str(),
            record_id,
            AuditAction::Update,
            old_data,
            new_data,
            changed_by,
        )
        .await
    }

    /// Records that `budget_id` was converted into `order_id`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the entry cannot be written.
    pub async fn record_conversion(
        &self,
        budget_id: BudgetId,
        order_id: OrderId,
        changed_by: UserId,
    ) -> Result<AuditLogEntry, StoreError> {
        self.append(
            CONVERSION_TABLE,
            budget_id.into_inner(),
            AuditAction::Conversion,
            json!({ "budget_id": budget_id }),
            json!({ "order_id": order_id }),
            changed_by,
        )
        .await
    }

    /// Returns every entry for one record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the store error if the query fails.
    pub async fn history(
        &self,
        table_name: &str,
        record_id: Uuid,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        let query = Query::new()
            .eq("table_name", table_name)
            .eq("record_id", record_id)
            .order_by_asc("created_at");
        store::search(self.store.as_ref(), Table::AuditLogs, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn writer() -> (Arc<MemoryStore>, AuditLogWriter) {
        let store = Arc::new(MemoryStore::new());
        let writer = AuditLogWriter::new(store.clone());
        (store, writer)
    }

    #[tokio::test]
    async fn test_record_status_change() {
        let (store, writer) = writer();
        let record_id = Uuid::new_v4();
        let actor = UserId::new();

        let entry = writer
            .record_status_change(Table::Orders, record_id, "pending", "confirmed", actor)
            .await
            .unwrap();

        assert_eq!(entry.table_name, "orders");
        assert_eq!(entry.action, AuditAction::Update);
        assert_eq!(entry.old_data, json!({ "status": "pending" }));
        assert_eq!(entry.new_data, json!({ "status": "confirmed" }));
        assert_eq!(entry.changed_by, actor);
        assert_eq!(store.count(Table::AuditLogs).await, 1);
    }

    #[tokio::test]
    async fn test_record_conversion() {
        let (_, writer) = writer();
        let budget_id = BudgetId::new();
        let order_id = OrderId::new();

        let entry = writer
            .record_conversion(budget_id, order_id, UserId::new())
            .await
            .unwrap();

        assert_eq!(entry.table_name, CONVERSION_TABLE);
        assert_eq!(entry.record_id, budget_id.into_inner());
        assert_eq!(entry.action, AuditAction::Conversion);
        assert_eq!(entry.old_data, json!({ "budget_id": budget_id.to_string() }));
        assert_eq!(entry.new_data, json!({ "order_id": order_id.to_string() }));
    }

    #[tokio::test]
    async fn test_history_is_scoped_and_oldest_first() {
        let (_, writer) = writer();
        let record_id = Uuid::new_v4();
        let actor = UserId::new();

        writer
            .record_status_change(Table::Budgets, record_id, "draft", "sent", actor)
            .await
            .unwrap();
        writer
            .record_status_change(Table::Budgets, record_id, "sent", "accepted", actor)
            .await
            .unwrap();
        writer
            .record_status_change(Table::Orders, record_id, "pending", "confirmed", actor)
            .await
            .unwrap();
        writer
            .record_status_change(Table::Budgets, Uuid::new_v4(), "draft", "sent", actor)
            .await
            .unwrap();

        let history = writer.history("budgets", record_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].new_data, json!({ "status": "sent" }));
        assert_eq!(history[1].new_data, json!({ "status": "accepted" }));
    }

    #[test]
    fn test_action_serde() {
        assert_eq!(serde_json::to_value(AuditAction::Update).unwrap(), json!("UPDATE"));
        assert_eq!(
            serde_json::to_value(AuditAction::Conversion).unwrap(),
            json!("CONVERSION")
        );
    }
}
