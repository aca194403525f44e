//! Dues (iuran) repository.
//!
//! Dues rows and the cashbook postings they require are written in the same
//! transaction, under the cashbook's [`LedgerGate`].

use chrono::{NaiveDate, Utc};
use orgkas_core::dues::{
    self as rules, CashPosting, DUES_CATEGORY, DuesState, DuesStatus, Frequency, PostingKind,
};
use orgkas_core::ledger::EntryInput;
use orgkas_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cashbook::{CashbookError, LedgerGate, append_in, reverse_in};
use super::db_app_error;
use crate::entities::{dues, members};

/// Error types for dues operations.
#[derive(Debug, thiserror::Error)]
pub enum DuesError {
    /// Invalid dues input.
    #[error(transparent)]
    Rule(#[from] rules::DuesError),

    /// Dues row not found.
    #[error("Dues not found: {0}")]
    NotFound(i32),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(i32),

    /// Cashbook posting failed.
    #[error(transparent)]
    Cashbook(#[from] CashbookError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<DuesError> for AppError {
    fn from(err: DuesError) -> Self {
        match err {
            DuesError::Rule(e) => Self::Validation(e.to_string()),
            e @ (DuesError::NotFound(_) | DuesError::MemberNotFound(_)) => {
                Self::NotFound(e.to_string())
            }
            DuesError::Cashbook(e) => e.into(),
            DuesError::Database(e) => db_app_error(&e),
        }
    }
}

/// Input for creating or replacing a dues row.
#[derive(Debug, Clone, Deserialize)]
pub struct DuesInput {
    /// Member paying.
    pub member_id: i32,
    /// Tariff the payment is for.
    #[serde(default)]
    pub tariff_id: Option<i32>,
    /// Period month, 1..=12.
    pub month: i32,
    /// Period year.
    pub year: i32,
    /// Amount in minor units.
    #[serde(default)]
    pub amount: i64,
    /// Billing frequency.
    #[serde(default)]
    pub frequency: Frequency,
    /// Payment date.
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
    /// Payment status.
    #[serde(default)]
    pub status: DuesStatus,
    /// Notes, also used in the cashbook description.
    #[serde(default)]
    pub notes: String,
}

impl DuesInput {
    fn state(&self) -> DuesState {
        DuesState {
            status: self.status,
            amount: self.amount,
            notes: self.notes.clone(),
            paid_on: self.paid_on,
        }
    }
}

/// Filter for listing dues.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DuesFilter {
    /// Only rows of this member.
    pub member_id: Option<i32>,
    /// Only rows of this year.
    pub year: Option<i32>,
    /// Only rows of this month.
    pub month: Option<i32>,
    /// Only rows with this status.
    pub status: Option<DuesStatus>,
}

/// Lookup of an existing payment for a member.
///
/// Fields left empty are not filtered on, so a lifetime tariff is found by
/// `frequency` and `tariff_id` alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentQuery {
    /// Period month.
    pub month: Option<i32>,
    /// Period year.
    pub year: Option<i32>,
    /// Billing frequency.
    pub frequency: Option<Frequency>,
    /// Tariff.
    pub tariff_id: Option<i32>,
}

/// A dues row with the member's name.
#[derive(Debug, Clone, Serialize)]
pub struct DuesWithMember {
    /// The dues row.
    #[serde(flatten)]
    pub dues: dues::Model,
    /// Name of the member, if the member still exists.
    pub member_name: Option<String>,
}

/// Dues repository.
#[derive(Debug, Clone)]
pub struct DuesRepository {
    db: DatabaseConnection,
    gate: LedgerGate,
}

impl DuesRepository {
    /// Creates a new dues repository sharing the cashbook's `gate`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, gate: LedgerGate) -> Self {
        Self { db, gate }
    }

    /// Lists dues newest period first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: &DuesFilter) -> Result<Vec<DuesWithMember>, DuesError> {
        let mut query = dues::Entity::find().find_also_related(members::Entity);
        if let Some(member_id) = filter.member_id {
            query = query.filter(dues::Column::MemberId.eq(member_id));
        }
        if let Some(year) = filter.year {
            query = query.filter(dues::Column::Year.eq(year));
        }
        if let Some(month) = filter.month {
            query = query.filter(dues::Column::Month.eq(month));
        }
        if let Some(status) = filter.status {
            query = query.filter(dues::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .order_by_desc(dues::Column::Year)
            .order_by_desc(dues::Column::Month)
            .order_by_desc(dues::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(dues, member)| DuesWithMember {
                dues,
                member_name: member.map(|m| m.name),
            })
            .collect())
    }

    /// Finds a dues row by id.
    ///
    /// # Errors
    ///
    /// Returns `DuesError::NotFound` if the row does not exist.
    pub async fn find(&self, id: i32) -> Result<dues::Model, DuesError> {
        dues::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DuesError::NotFound(id))
    }

    /// Finds the latest payment of a member matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_payment(
        &self,
        member_id: i32,
        query: &PaymentQuery,
    ) -> Result<Option<dues::Model>, DuesError> {
        let mut select = dues::Entity::find().filter(dues::Column::MemberId.eq(member_id));
        if let Some(month) = query.month {
            select = select.filter(dues::Column::Month.eq(month));
        }
        if let Some(year) = query.year {
            select = select.filter(dues::Column::Year.eq(year));
        }
        if let Some(frequency) = query.frequency {
            select = select.filter(dues::Column::Frequency.eq(frequency.as_str()));
        }
        if let Some(tariff_id) = query.tariff_id {
            select = select.filter(dues::Column::TariffId.eq(tariff_id));
        }

        Ok(select
            .order_by_desc(dues::Column::Year)
            .order_by_desc(dues::Column::Month)
            .order_by_desc(dues::Column::Id)
            .one(&self.db)
            .await?)
    }

    /// Creates a dues row, posting a paid row to the cashbook.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `DuesError::MemberNotFound`, or a database
    /// error. Nothing is written on failure.
    pub async fn create(&self, input: DuesInput) -> Result<dues::Model, DuesError> {
        rules::validate(input.month, input.year, input.amount)?;
        let postings = rules::postings_for_create(&input.state(), today());

        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        ensure_member(&txn, input.member_id).await?;

        let now = Utc::now();
        let row = dues::ActiveModel {
            member_id: Set(input.member_id),
            tariff_id: Set(input.tariff_id),
            month: Set(input.month),
            year: Set(input.year),
            amount: Set(input.amount),
            frequency: Set(input.frequency.as_str().to_string()),
            paid_on: Set(input.paid_on),
            status: Set(input.status.as_str().to_string()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        post(&txn, postings).await?;
        txn.commit().await?;

        info!(dues_id = row.id, member_id = row.member_id, status = %row.status, "Dues created");
        Ok(row)
    }

    /// Replaces a dues row, posting or reversing cashbook entries as its
    /// paid amount changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `DuesError::NotFound`, or a database error.
    pub async fn update(&self, id: i32, input: DuesInput) -> Result<dues::Model, DuesError> {
        rules::validate(input.month, input.year, input.amount)?;

        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        let existing = dues::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DuesError::NotFound(id))?;
        ensure_member(&txn, input.member_id).await?;

        let postings = rules::postings_for_update(&stored_state(&existing)?, &input.state(), today());

        let mut active: dues::ActiveModel = existing.into();
        active.member_id = Set(input.member_id);
        active.tariff_id = Set(input.tariff_id);
        active.month = Set(input.month);
        active.year = Set(input.year);
        active.amount = Set(input.amount);
        active.frequency = Set(input.frequency.as_str().to_string());
        active.paid_on = Set(input.paid_on);
        active.status = Set(input.status.as_str().to_string());
        active.notes = Set(input.notes);
        active.updated_at = Set(Utc::now());
        let row = active.update(&txn).await?;

        let posted = postings.len();
        post(&txn, postings).await?;
        txn.commit().await?;

        info!(dues_id = id, postings = posted, "Dues updated");
        Ok(row)
    }

    /// Deletes a dues row, reversing it in the cashbook if it was paid.
    ///
    /// # Errors
    ///
    /// Returns `DuesError::NotFound` or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), DuesError> {
        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        let existing = dues::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DuesError::NotFound(id))?;
        let postings = rules::postings_for_delete(&stored_state(&existing)?, today());

        dues::Entity::delete_by_id(id).exec(&txn).await?;
        post(&txn, postings).await?;
        txn.commit().await?;

        info!(dues_id = id, "Dues deleted");
        Ok(())
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn stored_state(row: &dues::Model) -> Result<DuesState, rules::DuesError> {
    Ok(DuesState {
        status: row.status.parse()?,
        amount: row.amount,
        notes: row.notes.clone(),
        paid_on: row.paid_on,
    })
}

async fn ensure_member<C: ConnectionTrait>(conn: &C, member_id: i32) -> Result<(), DuesError> {
    members::Entity::find_by_id(member_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(DuesError::MemberNotFound(member_id))
}

async fn post<C: ConnectionTrait>(conn: &C, postings: Vec<CashPosting>) -> Result<(), CashbookError> {
    for posting in postings {
        match posting.kind {
            PostingKind::Payment => {
                let input = EntryInput {
                    entry_date: posting.entry_date,
                    description: posting.description,
                    category: DUES_CATEGORY.to_string(),
                    debit: posting.amount,
                    credit: 0,
                };
                append_in(conn, &input).await?;
            }
            PostingKind::Reversal => {
                reverse_in(
                    conn,
                    posting.entry_date,
                    &posting.description,
                    DUES_CATEGORY,
                    posting.amount,
                )
                .await?;
            }
        }
    }
    Ok(())
}
