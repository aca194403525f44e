//! `SeaORM` Entity for tariffs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub amount: i64,
    pub frequency: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::member_tariffs::Entity")]
    MemberTariffs,
}

impl Related<super::member_tariffs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberTariffs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
