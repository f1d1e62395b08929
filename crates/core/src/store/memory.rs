//! In-memory entity store.
//!
//! Backs the test suites and local development. Rows are kept in insertion
//! order so that unsorted queries are deterministic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Comparison, Condition, EntityStore, Query, Record, StoreError, Table};

#[derive(Debug, Default)]
struct Rows {
    next_seq: u64,
    by_id: HashMap<Uuid, (u64, Record)>,
}

/// Entity store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, Rows>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows in `table`.
    pub async fn count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map_or(0, |rows| rows.by_id.len())
    }
}

fn record_id(table: Table, record: &Record) -> Result<Uuid, StoreError> {
    record
        .get("id")
        .and_then(Record::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| StoreError::Backend(format!("{table} record has no valid id")))
}

/// Orders two JSON scalars, reading strings as timestamps or decimals first.
fn compare_values(left: &Record, right: &Record) -> Option<Ordering> {
    match (left, right) {
        (Record::Null, Record::Null) => Some(Ordering::Equal),
        (Record::Null, _) => Some(Ordering::Less),
        (_, Record::Null) => Some(Ordering::Greater),
        (Record::String(a), Record::String(b)) => {
            if let (Ok(a), Ok(b)) = (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                return Some(a.with_timezone(&Utc).cmp(&b.with_timezone(&Utc)));
            }
            if let (Ok(a), Ok(b)) = (Decimal::from_str(a), Decimal::from_str(b)) {
                return Some(a.cmp(&b));
            }
            Some(a.cmp(b))
        }
        (Record::Number(a), Record::Number(b)) => {
            let a = Decimal::from_str(&a.to_string()).ok()?;
            let b = Decimal::from_str(&b.to_string()).ok()?;
            Some(a.cmp(&b))
        }
        (Record::Bool(a), Record::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches(record: &Record, condition: &Condition) -> bool {
    match condition {
        Condition::Compare { column, op, value } => {
            let field = record.get(column).unwrap_or(&Record::Null);
            // SQL semantics: comparisons against NULL never hold.
            if field.is_null() {
                return false;
            }
            let Some(ordering) = compare_values(field, &value.to_json()) else {
                return false;
            };
            match op {
                Comparison::Eq => ordering == Ordering::Equal,
                Comparison::Neq => ordering != Ordering::Equal,
                Comparison::Lt => ordering == Ordering::Less,
                Comparison::Lte => ordering != Ordering::Greater,
                Comparison::Gt => ordering == Ordering::Greater,
                Comparison::Gte => ordering != Ordering::Less,
            }
        }
        Condition::In { column, values } => {
            let field = record.get(column).unwrap_or(&Record::Null);
            values
                .iter()
                .any(|value| compare_values(field, &value.to_json()) == Some(Ordering::Equal))
                && !field.is_null()
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, table: Table, id: Uuid) -> Result<Record, StoreError> {
        let tables = self.tables.read().await;
        tables
            .get(&table)
            .and_then(|rows| rows.by_id.get(&id))
            .map(|(_, record)| record.clone())
            .ok_or(StoreError::NotFound { table, id })
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        if !record.is_object() {
            return Err(StoreError::Serialization(format!(
                "{table} record must be a JSON object"
            )));
        }
        let id = record_id(table, &record)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        if rows.by_id.contains_key(&id) {
            return Err(StoreError::Backend(format!(
                "duplicate key: {table} record {id} already exists"
            )));
        }
        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.by_id.insert(id, (seq, record.clone()));
        Ok(record)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Record) -> Result<Record, StoreError> {
        let Record::Object(changes) = patch else {
            return Err(StoreError::Serialization(
                "patch must be a JSON object".to_string(),
            ));
        };

        let mut tables = self.tables.write().await;
        let (_, record) = tables
            .get_mut(&table)
            .and_then(|rows| rows.by_id.get_mut(&id))
            .ok_or(StoreError::NotFound { table, id })?;

        if let Record::Object(fields) = record {
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .get_mut(&table)
            .and_then(|rows| rows.by_id.remove(&id))
            .map(|_| ())
            .ok_or(StoreError::NotFound { table, id })
    }

    async fn query(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<&(u64, Record)> = rows
            .by_id
            .values()
            .filter(|(_, record)| query.conditions.iter().all(|c| matches(record, c)))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);

        if let Some(order) = &query.order {
            hits.sort_by(|(_, a), (_, b)| {
                let a = a.get(&order.column).unwrap_or(&Record::Null);
                let b = b.get(&order.column).unwrap_or(&Record::Null);
                let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let (offset, limit) = query.range.map_or((0, usize::MAX), |range| {
            (
                usize::try_from(range.offset).unwrap_or(usize::MAX),
                usize::try_from(range.limit).unwrap_or(usize::MAX),
            )
        });

        Ok(hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
