//! Postgres implementation of the core entity store.
//!
//! Records cross this boundary as JSON. Each [`Table`] maps to one `SeaORM`
//! entity whose column names equal the record keys, so rows are built with
//! `ActiveModel::from_json` and returned by serializing the model.

use async_trait::async_trait;
use jardim_core::store::{
    Comparison, Condition, EntityStore, FilterValue, Query, Record, StoreError, Table,
};
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Value,
};
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::{audit_logs, budgets, customers, orders};

/// Runs `$body` with `$entity` bound to the entity module of `$table`.
macro_rules! with_entity {
    ($table:expr, $entity:ident => $body:expr) => {
        match $table {
            Table::Customers => {
                use customers as $entity;
                $body
            }
            Table::Orders => {
                use orders as $entity;
                $body
            }
            Table::Budgets => {
                use budgets as $entity;
                $body
            }
            Table::AuditLogs => {
                use audit_logs as $entity;
                $body
            }
        }
    };
}

/// Entity store backed by Postgres through `SeaORM`.
#[derive(Debug, Clone)]
pub struct SeaEntityStore {
    db: DatabaseConnection,
}

impl SeaEntityStore {
    /// Creates a store over an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn decode(err: DbErr) -> StoreError {
    StoreError::Serialization(err.to_string())
}

fn to_record<M: Serialize>(model: &M) -> Result<Record, StoreError> {
    Ok(serde_json::to_value(model)?)
}

fn to_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Uuid(id) => Value::from(*id),
        FilterValue::Text(text) => Value::from(text.clone()),
        FilterValue::Timestamp(ts) => Value::from(*ts),
        FilterValue::Decimal(amount) => Value::from(*amount),
    }
}

fn column<C: FromStr>(table: Table, name: &str) -> Result<C, StoreError> {
    C::from_str(name).map_err(|_| StoreError::Backend(format!("unknown column {table}.{name}")))
}

fn to_expr<C: ColumnTrait + FromStr>(
    table: Table,
    condition: &Condition,
) -> Result<SimpleExpr, StoreError> {
    match condition {
        Condition::Compare {
            column: name,
            op,
            value,
        } => {
            let col: C = column(table, name)?;
            let value = to_value(value);
            Ok(match op {
                Comparison::Eq => col.eq(value),
                Comparison::Neq => col.ne(value),
                Comparison::Lt => col.lt(value),
                Comparison::Lte => col.lte(value),
                Comparison::Gt => col.gt(value),
                Comparison::Gte => col.gte(value),
            })
        }
        Condition::In {
            column: name,
            values,
        } => {
            let col: C = column(table, name)?;
            Ok(col.is_in(values.iter().map(to_value)))
        }
    }
}

async fn find_one<E>(db: &DatabaseConnection, table: Table, id: Uuid) -> Result<Record, StoreError>
where
    E: EntityTrait,
    E::Model: Serialize,
    Uuid: Into<<E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType>,
{
    let model = E::find_by_id(id)
        .one(db)
        .await
        .map_err(backend)?
        .ok_or(StoreError::NotFound { table, id })?;
    to_record(&model)
}

async fn delete_one<E>(db: &DatabaseConnection, table: Table, id: Uuid) -> Result<(), StoreError>
where
    E: EntityTrait,
    Uuid: Into<<E::PrimaryKey as sea_orm::PrimaryKeyTrait>::ValueType>,
{
    let result = E::delete_by_id(id).exec(db).await.map_err(backend)?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound { table, id });
    }
    Ok(())
}

async fn select<E>(
    db: &DatabaseConnection,
    table: Table,
    query: &Query,
) -> Result<Vec<Record>, StoreError>
where
    E: EntityTrait,
    E::Column: FromStr,
    E::Model: Serialize,
{
    let mut select = E::find();
    for condition in &query.conditions {
        select = select.filter(to_expr::<E::Column>(table, condition)?);
    }
    if let Some(order) = &query.order {
        let col: E::Column = column(table, &order.column)?;
        let direction = if order.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        select = select.order_by(col, direction);
    }
    if let Some(range) = query.range {
        select = select.offset(range.offset).limit(range.limit);
    }

    let models = select.all(db).await.map_err(backend)?;
    models.iter().map(to_record).collect()
}

fn not_updated(table: Table, id: Uuid) -> impl FnOnce(DbErr) -> StoreError {
    move |err| match err {
        DbErr::RecordNotUpdated => StoreError::NotFound { table, id },
        other => backend(other),
    }
}

#[async_trait]
impl EntityStore for SeaEntityStore {
    async fn get(&self, table: Table, id: Uuid) -> Result<Record, StoreError> {
        with_entity!(table, entity => find_one::<entity::Entity>(&self.db, table, id).await)
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        with_entity!(table, entity => {
            let model = entity::ActiveModel::from_json(record)
                .map_err(decode)?
                .insert(&self.db)
                .await
                .map_err(backend)?;
            tracing::debug!(table = %table, id = %model.id, "Record inserted");
            to_record(&model)
        })
    }

    async fn update(&self, table: Table, id: Uuid, patch: Record) -> Result<Record, StoreError> {
        with_entity!(table, entity => {
            let mut active = entity::ActiveModel::from_json(patch).map_err(decode)?;
            active.set(entity::Column::Id, Value::from(id));
            let model = active
                .update(&self.db)
                .await
                .map_err(not_updated(table, id))?;
            tracing::debug!(table = %table, id = %id, "Record updated");
            to_record(&model)
        })
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        with_entity!(table, entity => delete_one::<entity::Entity>(&self.db, table, id).await)
    }

    async fn query(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        with_entity!(table, entity => select::<entity::Entity>(&self.db, table, query).await)
    }
}
