//! Entity store contract.
//!
//! The lifecycle managers never talk to a database directly. They read and
//! write JSON records through [`EntityStore`], which is implemented by the
//! in-memory [`MemoryStore`] and by the Postgres store in `jardim-db`.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A stored row, as a JSON object keyed by column name.
pub type Record = serde_json::Value;

/// Logical tables reachable through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Customer contact records.
    Customers,
    /// Orders.
    Orders,
    /// Budgets (quotations).
    Budgets,
    /// Append-only audit log.
    AuditLogs,
}

impl Table {
    /// Every table.
    pub const ALL: [Self; 4] = [Self::Customers, Self::Orders, Self::Budgets, Self::AuditLogs];

    /// Returns the table name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::Budgets => "budgets",
            Self::AuditLogs => "audit_logs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with the given id.
    #[error("{table} record {id} not found")]
    NotFound {
        /// Table that was searched.
        table: Table,
        /// Missing id.
        id: Uuid,
    },

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend rejected the operation.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Identifier column.
    Uuid(Uuid),
    /// Text or enum column.
    Text(String),
    /// Timestamp column.
    Timestamp(DateTime<Utc>),
    /// Numeric column.
    Decimal(Decimal),
}

impl FilterValue {
    /// Returns the JSON form the value takes inside a [`Record`].
    #[must_use]
    pub fn to_json(&self) -> Record {
        match self {
            Self::Uuid(id) => Record::String(id.to_string()),
            Self::Text(text) => Record::String(text.clone()),
            Self::Timestamp(ts) => serde_json::json!(ts),
            Self::Decimal(value) => Record::String(value.to_string()),
        }
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Decimal> for FilterValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

/// Comparison operators supported by [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

/// One filter clause. All clauses of a [`Query`] must hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> value`
    Compare {
        /// Column name.
        column: String,
        /// Operator.
        op: Comparison,
        /// Right-hand side.
        value: FilterValue,
    },
    /// `column IN (values)`
    In {
        /// Column name.
        column: String,
        /// Accepted values.
        values: Vec<FilterValue>,
    },
}

/// Sort clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column name.
    pub column: String,
    /// Sort newest/largest first.
    pub descending: bool,
}

/// Offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

/// Filter, ordering and range for [`EntityStore::query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Conjunction of clauses.
    pub conditions: Vec<Condition>,
    /// Optional sort.
    pub order: Option<OrderBy>,
    /// Optional window.
    pub range: Option<Range>,
}

impl Query {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(mut self, column: &str, op: Comparison, value: impl Into<FilterValue>) -> Self {
        self.conditions.push(Condition::Compare {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Eq, value)
    }

    /// Adds `column <> value`.
    #[must_use]
    pub fn neq(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Neq, value)
    }

    /// Adds `column < value`.
    #[must_use]
    pub fn lt(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Lt, value)
    }

    /// Adds `column <= value`.
    #[must_use]
    pub fn lte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Lte, value)
    }

    /// Adds `column > value`.
    #[must_use]
    pub fn gt(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Gt, value)
    }

    /// Adds `column >= value`.
    #[must_use]
    pub fn gte(self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.compare(column, Comparison::Gte, value)
    }

    /// Adds `column IN (values)`.
    #[must_use]
    pub fn is_in<V: Into<FilterValue>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sorts ascending by `column`.
    #[must_use]
    pub fn order_by_asc(mut self, column: &str) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    /// Sorts descending by `column`.
    #[must_use]
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    /// Restricts the result to `limit` rows after skipping `offset`.
    #[must_use]
    pub const fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some(Range { offset, limit });
        self
    }
}

/// Generic row storage used by the lifecycle managers.
///
/// Every record carries a UUID under the `id` key. `update` merges the
/// top-level keys of `patch` into the stored record and returns the result.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetches one record.
    async fn get(&self, table: Table, id: Uuid) -> Result<Record, StoreError>;

    /// Inserts a record and returns it as stored.
    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError>;

    /// Merges `patch` into the record and returns it as stored.
    async fn update(&self, table: Table, id: Uuid, patch: Record) -> Result<Record, StoreError>;

    /// Removes a record.
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError>;

    /// Returns the records matching `query`.
    async fn query(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError>;
}

/// Fetches and decodes one record.
///
/// # Errors
///
/// Returns `NotFound` if absent, `Serialization` if the row does not decode.
pub async fn fetch<T: DeserializeOwned>(
    store: &dyn EntityStore,
    table: Table,
    id: Uuid,
) -> Result<T, StoreError> {
    let record = store.get(table, id).await?;
    Ok(serde_json::from_value(record)?)
}

/// Encodes and inserts a value, returning it as stored.
///
/// # Errors
///
/// Returns the backend error, or `Serialization` if encoding fails.
pub async fn create<T: Serialize + DeserializeOwned>(
    store: &dyn EntityStore,
    table: Table,
    value: &T,
) -> Result<T, StoreError> {
    let record = serde_json::to_value(value)?;
    let stored = store.insert(table, record).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Applies a patch and decodes the updated record.
///
/// # Errors
///
/// Returns `NotFound` if absent, or the backend error.
pub async fn patch<T: DeserializeOwned>(
    store: &dyn EntityStore,
    table: Table,
    id: Uuid,
    changes: Record,
) -> Result<T, StoreError> {
    let stored = store.update(table, id, changes).await?;
    Ok(serde_json::from_value(stored)?)
}

/// Runs a query and decodes every row.
///
/// # Errors
///
/// Returns the backend error, or `Serialization` if a row does not decode.
pub async fn search<T: DeserializeOwned>(
    store: &dyn EntityStore,
    table: Table,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    store
        .query(table, query)
        .await?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Orders.as_str(), "orders");
        assert_eq!(Table::AuditLogs.to_string(), "audit_logs");
    }

    #[test]
    fn test_query_builder() {
        let id = Uuid::nil();
        let query = Query::new()
            .eq("user_id", id)
            .is_in("status", ["draft", "sent"])
            .order_by_desc("created_at")
            .range(50, 50);

        assert_eq!(query.conditions.len(), 2);
        assert_eq!(
            query.conditions[0],
            Condition::Compare {
                column: "user_id".to_string(),
                op: Comparison::Eq,
                value: FilterValue::Uuid(id),
            }
        );
        assert_eq!(
            query.order,
            Some(OrderBy {
                column: "created_at".to_string(),
                descending: true
            })
        );
        assert_eq!(query.range, Some(Range { offset: 50, limit: 50 }));
    }

    #[test]
    fn test_filter_value_json() {
        let id = Uuid::new_v4();
        assert_eq!(FilterValue::from(id).to_json(), serde_json::json!(id));
        assert_eq!(FilterValue::from("sent").to_json(), serde_json::json!("sent"));
        assert_eq!(
            FilterValue::from(Decimal::new(16200, 2)).to_json(),
            serde_json::json!("162.00")
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            table: Table::Budgets,
            id: Uuid::nil(),
        };
        assert_eq!(
            err.to_string(),
            "budgets record 00000000-0000-0000-0000-000000000000 not found"
        );
    }
}
