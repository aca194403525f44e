//! `SeaORM` Entity for members table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub nik: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub joined_on: Option<Date>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::member_tariffs::Entity")]
    MemberTariffs,
    #[sea_orm(has_many = "super::dues::Entity")]
    Dues,
    #[sea_orm(has_many = "super::assessments::Entity")]
    Assessments,
    #[sea_orm(has_many = "super::archery_games::Entity")]
    ArcheryGames,
}

impl Related<super::member_tariffs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberTariffs.def()
    }
}

impl Related<super::dues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dues.def()
    }
}

impl Related<super::assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessments.def()
    }
}

impl Related<super::archery_games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArcheryGames.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
