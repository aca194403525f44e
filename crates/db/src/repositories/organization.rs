//! Organization profile repository.
//!
//! There is one profile; the row with the highest id is the current one.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;

use crate::entities::organizations;

/// Input for saving the organization profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationInput {
    /// Organization name.
    pub name: String,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Logo URL or data URI.
    #[serde(default)]
    pub logo: Option<String>,
    /// Website.
    #[serde(default)]
    pub website: Option<String>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Organization repository.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the current profile, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current(&self) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .order_by_desc(organizations::Column::Id)
            .one(&self.db)
            .await
    }

    /// Updates the current profile, or creates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn save(&self, input: OrganizationInput) -> Result<organizations::Model, DbErr> {
        let now = Utc::now();
        let saved = if let Some(existing) = self.current().await? {
            let mut active: organizations::ActiveModel = existing.into();
            active.name = Set(input.name);
            active.address = Set(input.address);
            active.phone = Set(input.phone);
            active.email = Set(input.email);
            active.logo = Set(input.logo);
            active.website = Set(input.website);
            active.description = Set(input.description);
            active.updated_at = Set(now);
            active.update(&self.db).await?
        } else {
            organizations::ActiveModel {
                name: Set(input.name),
                address: Set(input.address),
                phone: Set(input.phone),
                email: Set(input.email),
                logo: Set(input.logo),
                website: Set(input.website),
                description: Set(input.description),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
        };

        info!(organization_id = saved.id, "Organization profile saved");
        Ok(saved)
    }
}
