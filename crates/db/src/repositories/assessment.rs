//! Assessment (penilaian) repository.
//!
//! Covers assessment types, monthly scores and the recap per member.

use std::collections::HashMap;

use chrono::Utc;
use orgkas_core::assessment::{self as rules, ScoreSummary, WeightedScore};
use orgkas_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::db_app_error;
use super::tariff::STATUS_ACTIVE;
use crate::entities::{assessment_types, assessments, members};

/// Error types for assessment operations.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    /// Invalid assessment input.
    #[error(transparent)]
    Rule(#[from] rules::AssessmentError),

    /// Assessment not found.
    #[error("Assessment not found: {0}")]
    NotFound(i32),

    /// Assessment type not found.
    #[error("Assessment type not found: {0}")]
    TypeNotFound(i32),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(i32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Rule(e) => Self::Validation(e.to_string()),
            e @ (AssessmentError::NotFound(_)
            | AssessmentError::TypeNotFound(_)
            | AssessmentError::MemberNotFound(_)) => Self::NotFound(e.to_string()),
            AssessmentError::Database(e) => db_app_error(&e),
        }
    }
}

/// Input for creating or replacing an assessment type.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentTypeInput {
    /// Display name, e.g. `Teknik`.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Weight in the recap, 1 when omitted.
    #[serde(default)]
    pub weight: Option<Decimal>,
    /// `aktif` or `nonaktif`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    STATUS_ACTIVE.to_string()
}

impl AssessmentTypeInput {
    fn weight(&self) -> Decimal {
        self.weight.unwrap_or(Decimal::ONE)
    }
}

/// Input for recording a score.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentInput {
    /// Member assessed.
    pub member_id: i32,
    /// Assessment type.
    pub assessment_type_id: i32,
    /// Period month, 1..=12.
    pub month: i32,
    /// Period year.
    pub year: i32,
    /// Score, 0..=100.
    pub score: Decimal,
    /// Free text.
    #[serde(default)]
    pub notes: Option<String>,
}

/// An assessment with member and type names.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRow {
    /// The assessment.
    #[serde(flatten)]
    pub assessment: assessments::Model,
    /// Member name.
    pub member_name: Option<String>,
    /// Assessment type name.
    pub type_name: Option<String>,
}

/// A member's recap for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecap {
    /// Member.
    pub member_id: i32,
    /// Member name.
    pub member_name: String,
    /// Count, mean and weighted mean of the member's scores.
    #[serde(flatten)]
    pub summary: ScoreSummary,
}

/// Assessment repository.
#[derive(Debug, Clone)]
pub struct AssessmentRepository {
    db: DatabaseConnection,
}

impl AssessmentRepository {
    /// Creates a new assessment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists assessment types by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_types(
        &self,
        active_only: bool,
    ) -> Result<Vec<assessment_types::Model>, AssessmentError> {
        let mut query = assessment_types::Entity::find();
        if active_only {
            query = query.filter(assessment_types::Column::Status.eq(STATUS_ACTIVE));
        }
        Ok(query
            .order_by_asc(assessment_types::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds an assessment type by id.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::TypeNotFound` if it does not exist.
    pub async fn find_type(&self, id: i32) -> Result<assessment_types::Model, AssessmentError> {
        assessment_types::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssessmentError::TypeNotFound(id))
    }

    /// Creates an assessment type.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error.
    pub async fn create_type(
        &self,
        input: AssessmentTypeInput,
    ) -> Result<assessment_types::Model, AssessmentError> {
        let weight = input.weight();
        rules::validate_type(&input.name, weight)?;

        let now = Utc::now();
        Ok(assessment_types::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            weight: Set(weight),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    /// Replaces an assessment type.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::TypeNotFound`, a validation error, or a
    /// database error.
    pub async fn update_type(
        &self,
        id: i32,
        input: AssessmentTypeInput,
    ) -> Result<assessment_types::Model, AssessmentError> {
        let weight = input.weight();
        rules::validate_type(&input.name, weight)?;

        let mut active: assessment_types::ActiveModel = self.find_type(id).await?.into();
        active.name = Set(input.name.trim().to_string());
        active.description = Set(input.description);
        active.weight = Set(weight);
        active.status = Set(input.status);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes an assessment type and its scores.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::TypeNotFound` or a database error.
    pub async fn delete_type(&self, id: i32) -> Result<(), AssessmentError> {
        let result = assessment_types::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AssessmentError::TypeNotFound(id));
        }
        Ok(())
    }

    /// Lists assessments for a period, optionally for one member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        month: Option<i32>,
        year: Option<i32>,
        member_id: Option<i32>,
    ) -> Result<Vec<AssessmentRow>, AssessmentError> {
        let mut query = assessments::Entity::find().find_also_related(members::Entity);
        if let Some(month) = month {
            query = query.filter(assessments::Column::Month.eq(month));
        }
        if let Some(year) = year {
            query = query.filter(assessments::Column::Year.eq(year));
        }
        if let Some(member_id) = member_id {
            query = query.filter(assessments::Column::MemberId.eq(member_id));
        }
        let rows = query
            .order_by_desc(assessments::Column::Year)
            .order_by_desc(assessments::Column::Month)
            .order_by_asc(members::Column::Name)
            .order_by_asc(assessments::Column::Id)
            .all(&self.db)
            .await?;

        let types = self.type_names().await?;
        Ok(rows
            .into_iter()
            .map(|(assessment, member)| AssessmentRow {
                type_name: types.get(&assessment.assessment_type_id).cloned(),
                member_name: member.map(|m| m.name),
                assessment,
            })
            .collect())
    }

    /// Records a score, replacing any score of the same member, type and period.
    ///
    /// # Errors
    ///
    /// Returns a validation error, a not-found error for the member or type,
    /// or a database error.
    pub async fn upsert(&self, input: AssessmentInput) -> Result<assessments::Model, AssessmentError> {
        rules::validate_score(input.score)?;
        rules::validate_month(input.month)?;

        let txn = self.db.begin().await?;
        if members::Entity::find_by_id(input.member_id).one(&txn).await?.is_none() {
            return Err(AssessmentError::MemberNotFound(input.member_id));
        }
        if assessment_types::Entity::find_by_id(input.assessment_type_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(AssessmentError::TypeNotFound(input.assessment_type_id));
        }

        let existing = assessments::Entity::find()
            .filter(assessments::Column::MemberId.eq(input.member_id))
            .filter(assessments::Column::AssessmentTypeId.eq(input.assessment_type_id))
            .filter(assessments::Column::Month.eq(input.month))
            .filter(assessments::Column::Year.eq(input.year))
            .one(&txn)
            .await?;

        let now = Utc::now();
        let saved = if let Some(existing) = existing {
            let mut active: assessments::ActiveModel = existing.into();
            active.score = Set(input.score);
            active.notes = Set(input.notes);
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            assessments::ActiveModel {
                member_id: Set(input.member_id),
                assessment_type_id: Set(input.assessment_type_id),
                month: Set(input.month),
                year: Set(input.year),
                score: Set(input.score),
                notes: Set(input.notes),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        };
        txn.commit().await?;

        info!(assessment_id = saved.id, member_id = saved.member_id, "Assessment saved");
        Ok(saved)
    }

    /// Changes the score and notes of an assessment.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotFound`, a validation error, or a database
    /// error.
    pub async fn update(
        &self,
        id: i32,
        score: Decimal,
        notes: Option<String>,
    ) -> Result<assessments::Model, AssessmentError> {
        rules::validate_score(score)?;
        let existing = assessments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssessmentError::NotFound(id))?;

        let mut active: assessments::ActiveModel = existing.into();
        active.score = Set(score);
        active.notes = Set(notes);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes an assessment.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotFound` or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), AssessmentError> {
        let result = assessments::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AssessmentError::NotFound(id));
        }
        Ok(())
    }

    /// Recap per member for a period, ordered by member name.
    ///
    /// Without `member_id` every active member is listed, those without
    /// scores in the period with a zero count and zero averages. With
    /// `member_id` only that member is listed, whatever their status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recap(
        &self,
        month: i32,
        year: i32,
        member_id: Option<i32>,
    ) -> Result<Vec<MemberRecap>, AssessmentError> {
        let mut query = members::Entity::find();
        query = match member_id {
            Some(id) => query.filter(members::Column::Id.eq(id)),
            None => query.filter(members::Column::Status.eq(STATUS_ACTIVE)),
        };
        let roster = query
            .order_by_asc(members::Column::Name)
            .order_by_asc(members::Column::Id)
            .all(&self.db)
            .await?;

        let weights: HashMap<i32, Decimal> = assessment_types::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.weight))
            .collect();

        let mut scored: HashMap<i32, Vec<WeightedScore>> = HashMap::new();
        for row in self.list(Some(month), Some(year), member_id).await? {
            scored
                .entry(row.assessment.member_id)
                .or_default()
                .push(WeightedScore {
                    score: row.assessment.score,
                    weight: weights
                        .get(&row.assessment.assessment_type_id)
                        .copied()
                        .unwrap_or(Decimal::ONE),
                });
        }

        Ok(roster
            .into_iter()
            .map(|member| MemberRecap {
                summary: scored
                    .get(&member.id)
                    .map(|scores| rules::summarize(scores))
                    .unwrap_or_default(),
                member_id: member.id,
                member_name: member.name,
            })
            .collect())
    }

    async fn type_names(&self) -> Result<HashMap<i32, String>, DbErr> {
        Ok(assessment_types::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect())
    }
}
