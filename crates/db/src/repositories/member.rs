//! Member (anggota) repository with tariff assignments.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use orgkas_core::auth::names_match;
use orgkas_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::db_app_error;
use super::tariff::STATUS_ACTIVE;
use crate::entities::{dues, member_tariffs, members, tariffs};

/// Error types for member operations.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    /// Member not found.
    #[error("Member not found: {0}")]
    NotFound(i32),

    /// Tariff not found.
    #[error("Tariff not found: {0}")]
    TariffNotFound(i32),

    /// Tariff is not assigned to the member.
    #[error("Tariff {tariff_id} is not assigned to member {member_id}")]
    NotAssigned {
        /// Member.
        member_id: i32,
        /// Tariff.
        tariff_id: i32,
    },

    /// Name is blank.
    #[error("Member name is required")]
    MissingName,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<MemberError> for AppError {
    fn from(err: MemberError) -> Self {
        match err {
            e @ (MemberError::NotFound(_)
            | MemberError::TariffNotFound(_)
            | MemberError::NotAssigned { .. }) => Self::NotFound(e.to_string()),
            e @ MemberError::MissingName => Self::Validation(e.to_string()),
            MemberError::Database(e) => db_app_error(&e),
        }
    }
}

/// Input for creating or replacing a member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    /// Full name.
    pub name: String,
    /// National identity number.
    #[serde(default)]
    pub nik: Option<String>,
    /// Address.
    #[serde(default)]
    pub address: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Date the member joined.
    #[serde(default)]
    pub joined_on: Option<NaiveDate>,
    /// `aktif` or `nonaktif`.
    #[serde(default = "default_status")]
    pub status: String,
    /// Tariffs to assign. On update, `None` keeps the current assignments.
    #[serde(default)]
    pub tariff_ids: Option<Vec<i32>>,
}

fn default_status() -> String {
    STATUS_ACTIVE.to_string()
}

/// Everything shown on a member's detail page.
#[derive(Debug, Clone, Serialize)]
pub struct MemberDetail {
    /// The member.
    pub member: members::Model,
    /// Every tariff, for the assignment picker.
    pub all_tariffs: Vec<tariffs::Model>,
    /// Tariffs assigned to the member.
    pub assigned_tariffs: Vec<tariffs::Model>,
    /// The member's dues for the requested year.
    pub dues: Vec<dues::Model>,
}

/// Member repository.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists members by name, optionally with a given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<members::Model>, MemberError> {
        let mut query = members::Entity::find();
        if let Some(status) = status {
            query = query.filter(members::Column::Status.eq(status));
        }
        Ok(query
            .order_by_asc(members::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a member by id.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` if the member does not exist.
    pub async fn find(&self, id: i32) -> Result<members::Model, MemberError> {
        find_member(&self.db, id).await
    }

    /// Finds the member whose name matches `name`, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<members::Model>, MemberError> {
        let members = members::Entity::find()
            .order_by_asc(members::Column::Id)
            .all(&self.db)
            .await?;
        Ok(members.into_iter().find(|m| names_match(&m.name, name)))
    }

    /// Counts members.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, MemberError> {
        Ok(members::Entity::find().count(&self.db).await?)
    }

    /// Creates a member and assigns the given tariffs.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `MemberError::TariffNotFound`, or a
    /// database error. Nothing is written on failure.
    pub async fn create(&self, input: MemberInput) -> Result<members::Model, MemberError> {
        if input.name.trim().is_empty() {
            return Err(MemberError::MissingName);
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();
        let member = members::ActiveModel {
            name: Set(input.name.trim().to_string()),
            nik: Set(input.nik),
            address: Set(input.address),
            phone: Set(input.phone),
            email: Set(input.email),
            joined_on: Set(input.joined_on),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(ids) = &input.tariff_ids {
            replace_assignments(&txn, member.id, ids).await?;
        }
        txn.commit().await?;

        info!(member_id = member.id, "Member created");
        Ok(member)
    }

    /// Replaces a member, and its tariffs when `tariff_ids` is given.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound`, a validation error, or a database error.
    pub async fn update(&self, id: i32, input: MemberInput) -> Result<members::Model, MemberError> {
        if input.name.trim().is_empty() {
            return Err(MemberError::MissingName);
        }

        let txn = self.db.begin().await?;
        let mut active: members::ActiveModel = find_member(&txn, id).await?.into();
        active.name = Set(input.name.trim().to_string());
        active.nik = Set(input.nik);
        active.address = Set(input.address);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.joined_on = Set(input.joined_on);
        active.status = Set(input.status);
        active.updated_at = Set(Utc::now());
        let member = active.update(&txn).await?;

        if let Some(ids) = &input.tariff_ids {
            replace_assignments(&txn, id, ids).await?;
        }
        txn.commit().await?;

        Ok(member)
    }

    /// Deletes a member with its assignments, dues, assessments and games.
    ///
    /// Cashbook entries already posted for the member's dues are kept.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), MemberError> {
        let result = members::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(MemberError::NotFound(id));
        }
        info!(member_id = id, "Member deleted");
        Ok(())
    }

    /// Lists the tariffs assigned to a member.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` or a database error.
    pub async fn tariffs(&self, member_id: i32) -> Result<Vec<tariffs::Model>, MemberError> {
        find_member(&self.db, member_id).await?;
        assigned_tariffs(&self.db, member_id).await
    }

    /// Assigns a tariff to a member. Assigning twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound`, `MemberError::TariffNotFound`, or a
    /// database error.
    pub async fn assign_tariff(&self, member_id: i32, tariff_id: i32) -> Result<(), MemberError> {
        let txn = self.db.begin().await?;
        find_member(&txn, member_id).await?;
        assign(&txn, member_id, tariff_id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Removes a tariff from a member.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotAssigned` if the pair does not exist.
    pub async fn remove_tariff(&self, member_id: i32, tariff_id: i32) -> Result<(), MemberError> {
        let result = member_tariffs::Entity::delete_many()
            .filter(member_tariffs::Column::MemberId.eq(member_id))
            .filter(member_tariffs::Column::TariffId.eq(tariff_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(MemberError::NotAssigned {
                member_id,
                tariff_id,
            });
        }
        Ok(())
    }

    /// Replaces every tariff assignment of a member.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound`, `MemberError::TariffNotFound`, or a
    /// database error. Nothing changes on failure.
    pub async fn replace_tariffs(
        &self,
        member_id: i32,
        tariff_ids: &[i32],
    ) -> Result<Vec<tariffs::Model>, MemberError> {
        let txn = self.db.begin().await?;
        find_member(&txn, member_id).await?;
        replace_assignments(&txn, member_id, tariff_ids).await?;
        let assigned = assigned_tariffs(&txn, member_id).await?;
        txn.commit().await?;

        info!(member_id, tariffs = assigned.len(), "Member tariffs replaced");
        Ok(assigned)
    }

    /// Loads a member's detail page data for `year`.
    ///
    /// # Errors
    ///
    /// Returns `MemberError::NotFound` or a database error.
    pub async fn detail(&self, member_id: i32, year: i32) -> Result<MemberDetail, MemberError> {
        let member = find_member(&self.db, member_id).await?;
        let all_tariffs = tariffs::Entity::find()
            .order_by_asc(tariffs::Column::Name)
            .all(&self.db)
            .await?;
        let assigned_tariffs = assigned_tariffs(&self.db, member_id).await?;
        let dues = dues::Entity::find()
            .filter(dues::Column::MemberId.eq(member_id))
            .filter(dues::Column::Year.eq(year))
            .order_by_asc(dues::Column::Month)
            .order_by_asc(dues::Column::Id)
            .all(&self.db)
            .await?;

        Ok(MemberDetail {
            member,
            all_tariffs,
            assigned_tariffs,
            dues,
        })
    }
}

async fn find_member<C: ConnectionTrait>(conn: &C, id: i32) -> Result<members::Model, MemberError> {
    members::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(MemberError::NotFound(id))
}

async fn assigned_tariffs<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
) -> Result<Vec<tariffs::Model>, MemberError> {
    Ok(tariffs::Entity::find()
        .join(JoinType::InnerJoin, tariffs::Relation::MemberTariffs.def())
        .filter(member_tariffs::Column::MemberId.eq(member_id))
        .order_by_asc(tariffs::Column::Name)
        .all(conn)
        .await?)
}

async fn assign<C: ConnectionTrait>(conn: &C, member_id: i32, tariff_id: i32) -> Result<(), MemberError> {
    if tariffs::Entity::find_by_id(tariff_id).one(conn).await?.is_none() {
        return Err(MemberError::TariffNotFound(tariff_id));
    }

    let existing = member_tariffs::Entity::find()
        .filter(member_tariffs::Column::MemberId.eq(member_id))
        .filter(member_tariffs::Column::TariffId.eq(tariff_id))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    member_tariffs::ActiveModel {
        member_id: Set(member_id),
        tariff_id: Set(tariff_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn replace_assignments<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
    tariff_ids: &[i32],
) -> Result<(), MemberError> {
    member_tariffs::Entity::delete_many()
        .filter(member_tariffs::Column::MemberId.eq(member_id))
        .exec(conn)
        .await?;

    let unique: BTreeSet<i32> = tariff_ids.iter().copied().collect();
    for tariff_id in unique {
        assign(conn, member_id, tariff_id).await?;
    }
    Ok(())
}
