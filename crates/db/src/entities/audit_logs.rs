//! `SeaORM` Entity for audit_logs table.
//!
//! Rows are insert-only; the database rejects updates and deletes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_name: String,
    pub record_id: Uuid,
    pub action: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub old_data: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub new_data: Json,
    pub changed_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
