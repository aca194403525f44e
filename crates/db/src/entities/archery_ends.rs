//! `SeaORM` Entity for archery_ends table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "archery_ends")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub game_id: i32,
    pub session_number: i32,
    pub end_number: i32,
    pub total_score: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::archery_games::Entity",
        from = "Column::GameId",
        to = "super::archery_games::Column::Id",
        on_delete = "Cascade"
    )]
    ArcheryGames,
}

impl Related<super::archery_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArcheryGames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
