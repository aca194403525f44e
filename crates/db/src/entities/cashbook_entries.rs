//! `SeaORM` Entity for cashbook_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cashbook_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entry_date: Date,
    pub description: String,
    pub category: String,
    pub debit: i64,
    pub credit: i64,
    pub balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
