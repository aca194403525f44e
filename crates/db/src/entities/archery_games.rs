//! `SeaORM` Entity for archery_games table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "archery_games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub member_id: i32,
    pub played_on: Date,
    pub session_count: i32,
    pub total_score: i64,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        on_delete = "Cascade"
    )]
    Members,
    #[sea_orm(has_many = "super::archery_ends::Entity")]
    ArcheryEnds,
    #[sea_orm(has_many = "super::archery_arrows::Entity")]
    ArcheryArrows,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::archery_ends::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArcheryEnds.def()
    }
}

impl Related<super::archery_arrows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArcheryArrows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
