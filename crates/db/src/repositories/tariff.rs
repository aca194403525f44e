//! Tariff (tarif) repository.

use chrono::Utc;
use orgkas_core::dues::Frequency;
use orgkas_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use tracing::info;

use super::db_app_error;
use crate::entities::tariffs;

/// Status of an active tariff or member.
pub const STATUS_ACTIVE: &str = "aktif";

/// Error types for tariff operations.
#[derive(Debug, thiserror::Error)]
pub enum TariffError {
    /// Tariff not found.
    #[error("Tariff not found: {0}")]
    NotFound(i32),

    /// Name is blank.
    #[error("Tariff name is required")]
    MissingName,

    /// Amount is zero or negative.
    #[error("Tariff amount must be positive")]
    InvalidAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TariffError> for AppError {
    fn from(err: TariffError) -> Self {
        match err {
            e @ TariffError::NotFound(_) => Self::NotFound(e.to_string()),
            e @ (TariffError::MissingName | TariffError::InvalidAmount) => {
                Self::Validation(e.to_string())
            }
            TariffError::Database(e) => db_app_error(&e),
        }
    }
}

/// Input for creating or replacing a tariff.
#[derive(Debug, Clone, Deserialize)]
pub struct TariffInput {
    /// Display name.
    pub name: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Billing frequency.
    #[serde(default)]
    pub frequency: Frequency,
    /// Free text.
    #[serde(default)]
    pub notes: Option<String>,
    /// `aktif` or `nonaktif`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    STATUS_ACTIVE.to_string()
}

impl TariffInput {
    fn validate(&self) -> Result<(), TariffError> {
        if self.name.trim().is_empty() {
            return Err(TariffError::MissingName);
        }
        if self.amount <= 0 {
            return Err(TariffError::InvalidAmount);
        }
        Ok(())
    }
}

/// Tariff repository.
#[derive(Debug, Clone)]
pub struct TariffRepository {
    db: DatabaseConnection,
}

impl TariffRepository {
    /// Creates a new tariff repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists tariffs by name, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<tariffs::Model>, TariffError> {
        let mut query = tariffs::Entity::find();
        if active_only {
            query = query.filter(tariffs::Column::Status.eq(STATUS_ACTIVE));
        }
        Ok(query
            .order_by_asc(tariffs::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a tariff by id.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::NotFound` if the tariff does not exist.
    pub async fn find(&self, id: i32) -> Result<tariffs::Model, TariffError> {
        tariffs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TariffError::NotFound(id))
    }

    /// Creates a tariff.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a database error.
    pub async fn create(&self, input: TariffInput) -> Result<tariffs::Model, TariffError> {
        input.validate()?;
        let now = Utc::now();
        let tariff = tariffs::ActiveModel {
            name: Set(input.name.trim().to_string()),
            amount: Set(input.amount),
            frequency: Set(input.frequency.as_str().to_string()),
            notes: Set(input.notes),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(tariff_id = tariff.id, "Tariff created");
        Ok(tariff)
    }

    /// Replaces a tariff.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::NotFound`, a validation error, or a database error.
    pub async fn update(&self, id: i32, input: TariffInput) -> Result<tariffs::Model, TariffError> {
        input.validate()?;
        let mut active: tariffs::ActiveModel = self.find(id).await?.into();
        active.name = Set(input.name.trim().to_string());
        active.amount = Set(input.amount);
        active.frequency = Set(input.frequency.as_str().to_string());
        active.notes = Set(input.notes);
        active.status = Set(input.status);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a tariff; assignments go with it, dues keep their rows.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::NotFound` or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), TariffError> {
        let result = tariffs::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(TariffError::NotFound(id));
        }
        info!(tariff_id = id, "Tariff deleted");
        Ok(())
    }
}
