//! User repository for database operations.

use chrono::Utc;
use orgkas_core::auth::UserRole;
use orgkas_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use super::db_app_error;
use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(i32),

    /// Username already in use.
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Username or name is blank.
    #[error("Username and name are required")]
    MissingField,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            e @ UserError::NotFound(_) => Self::NotFound(e.to_string()),
            e @ UserError::UsernameTaken(_) => Self::Conflict(e.to_string()),
            e @ UserError::MissingField => Self::Validation(e.to_string()),
            UserError::Database(e) => db_app_error(&e),
        }
    }
}

/// Profile fields of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: UserRole,
}

impl UserInput {
    fn validate(&self) -> Result<(), UserError> {
        if self.username.trim().is_empty() || self.name.trim().is_empty() {
            return Err(UserError::MissingField);
        }
        Ok(())
    }
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist.
    pub async fn find_by_id(&self, id: i32) -> Result<users::Model, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Lists users by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
    }

    /// Counts users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        users::Entity::find().count(&self.db).await
    }

    /// Creates a new user with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UserError::UsernameTaken`, a validation error, or a database
    /// error.
    pub async fn create(&self, input: UserInput, password_hash: &str) -> Result<users::Model, UserError> {
        input.validate()?;
        let username = input.username.trim().to_string();
        if self.find_by_username(&username).await?.is_some() {
            return Err(UserError::UsernameTaken(username));
        }

        let now = Utc::now();
        let user = users::ActiveModel {
            username: Set(username),
            password_hash: Set(password_hash.to_string()),
            name: Set(input.name.trim().to_string()),
            role: Set(input.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Updates a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound`, `UserError::UsernameTaken`, or a
    /// database error.
    pub async fn update(&self, id: i32, input: UserInput) -> Result<users::Model, UserError> {
        input.validate()?;
        let existing = self.find_by_id(id).await?;
        let username = input.username.trim().to_string();
        if let Some(other) = self.find_by_username(&username).await?
            && other.id != id
        {
            return Err(UserError::UsernameTaken(username));
        }

        let mut active: users::ActiveModel = existing.into();
        active.username = Set(username);
        active.name = Set(input.name.trim().to_string());
        active.role = Set(input.role.as_str().to_string());
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Replaces a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` or a database error.
    pub async fn set_password(&self, id: i32, password_hash: &str) -> Result<(), UserError> {
        let mut active: users::ActiveModel = self.find_by_id(id).await?.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        info!(user_id = id, "Password changed");
        Ok(())
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), UserError> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
