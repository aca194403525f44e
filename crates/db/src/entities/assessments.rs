//! `SeaORM` Entity for assessments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub member_id: i32,
    pub assessment_type_id: i32,
    pub month: i32,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))")]
    pub score: Decimal,
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
    #[sea_orm(
        belongs_to = "super::assessment_types::Entity",
        from = "Column::AssessmentTypeId",
        to = "super::assessment_types::Column::Id",
        on_delete = "Cascade"
    )]
    AssessmentTypes,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::assessment_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssessmentTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
