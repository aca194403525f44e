//! Cashbook (buku kas) repository.
//!
//! Every mutation loads the chain, asks [`LedgerService`] for the balance
//! writes and persists them in a single transaction while holding the
//! [`LedgerGate`]. A failed write rolls the whole mutation back.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use orgkas_core::ledger::{
    BalanceRow, BalanceWrite, ChainMismatch, EntryInput, LedgerError, LedgerService, LedgerTotals,
    verify_chain,
};
use orgkas_shared::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::db_app_error;
use crate::entities::cashbook_entries;

/// Error types for cashbook operations.
#[derive(Debug, thiserror::Error)]
pub enum CashbookError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CashbookError> for AppError {
    fn from(err: CashbookError) -> Self {
        match err {
            CashbookError::Ledger(e @ LedgerError::EntryNotFound(_)) => {
                Self::NotFound(e.to_string())
            }
            CashbookError::Ledger(e @ LedgerError::BalanceOverflow) => {
                Self::BusinessRule(e.to_string())
            }
            CashbookError::Ledger(e) => Self::Validation(e.to_string()),
            CashbookError::Database(e) => db_app_error(&e),
        }
    }
}

/// Process-wide lock serializing cashbook mutations.
///
/// Clones share the same lock. Hold the guard for the whole transaction.
#[derive(Debug, Clone, Default)]
pub struct LedgerGate(Arc<Mutex<()>>);

impl LedgerGate {
    /// Creates a new, unlocked gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the cashbook.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

/// Cashbook repository.
#[derive(Debug, Clone)]
pub struct CashbookRepository {
    db: DatabaseConnection,
    gate: LedgerGate,
}

impl CashbookRepository {
    /// Creates a new cashbook repository sharing `gate` with other writers.
    #[must_use]
    pub const fn new(db: DatabaseConnection, gate: LedgerGate) -> Self {
        Self { db, gate }
    }

    /// Lists entries newest first (date desc, id desc).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<cashbook_entries::Model>, CashbookError> {
        Ok(cashbook_entries::Entity::find()
            .order_by_desc(cashbook_entries::Column::EntryDate)
            .order_by_desc(cashbook_entries::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Lists entries in chain order (id asc).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_chain(&self) -> Result<Vec<cashbook_entries::Model>, CashbookError> {
        Ok(cashbook_entries::Entity::find()
            .order_by_asc(cashbook_entries::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Finds an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` if the entry does not exist.
    pub async fn find(&self, id: i32) -> Result<cashbook_entries::Model, CashbookError> {
        cashbook_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(id).into())
    }

    /// Sums debits and credits; the balance is the last row's balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals(&self) -> Result<LedgerTotals, CashbookError> {
        let rows = chain_rows(&self.db).await?;
        Ok(LedgerTotals::from_rows(&rows))
    }

    /// Re-derives the chain and reports rows whose stored balance differs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn verify(&self) -> Result<Vec<ChainMismatch>, CashbookError> {
        let rows = chain_rows(&self.db).await?;
        Ok(verify_chain(&rows))
    }

    /// Appends a manual entry.
    ///
    /// # Errors
    ///
    /// Returns a ledger error for invalid input or a database error.
    pub async fn create(&self, input: EntryInput) -> Result<cashbook_entries::Model, CashbookError> {
        input.validate()?;

        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;
        let entry = append_in(&txn, &input).await?;
        txn.commit().await?;

        Ok(entry)
    }

    /// Edits an entry and re-chains every later row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` for an unknown id, a ledger error
    /// for invalid input, or a database error.
    pub async fn update(
        &self,
        id: i32,
        input: EntryInput,
    ) -> Result<cashbook_entries::Model, CashbookError> {
        input.validate()?;

        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        let existing = cashbook_entries::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let rows = chain_rows(&txn).await?;
        let plan = LedgerService::plan_update(&rows, id, input.debit, input.credit)?;

        let mut active: cashbook_entries::ActiveModel = existing.into();
        active.entry_date = Set(input.entry_date);
        active.description = Set(input.description);
        active.category = Set(input.category);
        active.debit = Set(input.debit);
        active.credit = Set(input.credit);
        active.balance = Set(plan.balance);
        let entry = active.update(&txn).await?;

        write_balances(&txn, &plan.cascade).await?;
        txn.commit().await?;

        info!(entry_id = id, rechained = plan.cascade.len(), "Cashbook entry updated");
        Ok(entry)
    }

    /// Deletes an entry and re-chains every later row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` for an unknown id or a database error.
    pub async fn delete(&self, id: i32) -> Result<(), CashbookError> {
        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        let rows = chain_rows(&txn).await?;
        let writes = LedgerService::plan_delete(&rows, id)?;

        cashbook_entries::Entity::delete_by_id(id).exec(&txn).await?;
        write_balances(&txn, &writes).await?;
        txn.commit().await?;

        info!(entry_id = id, rechained = writes.len(), "Cashbook entry deleted");
        Ok(())
    }

    /// Appends a reversing credit of `amount`, flooring the balance at 0.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidReversal` for a non-positive amount,
    /// `LedgerError::MissingDescription` for a blank description, or a
    /// database error.
    pub async fn reverse(
        &self,
        entry_date: NaiveDate,
        description: &str,
        category: &str,
        amount: i64,
    ) -> Result<cashbook_entries::Model, CashbookError> {
        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;
        let entry = reverse_in(&txn, entry_date, description, category, amount).await?;
        txn.commit().await?;

        Ok(entry)
    }

    /// Rewrites every stored balance that disagrees with the chain.
    ///
    /// Returns the number of rows rewritten.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn rechain(&self) -> Result<usize, CashbookError> {
        let _guard = self.gate.lock().await;
        let txn = self.db.begin().await?;

        let rows = chain_rows(&txn).await?;
        let writes = LedgerService::plan_rechain(&rows)?;
        write_balances(&txn, &writes).await?;
        txn.commit().await?;

        info!(rewritten = writes.len(), "Cashbook chain rebuilt");
        Ok(writes.len())
    }

    /// Shared gate, for repositories that post to the cashbook.
    #[must_use]
    pub fn gate(&self) -> &LedgerGate {
        &self.gate
    }
}

/// Loads the chain as balance rows in id order.
pub(crate) async fn chain_rows<C: ConnectionTrait>(conn: &C) -> Result<Vec<BalanceRow>, DbErr> {
    let rows: Vec<(i32, i64, i64, i64)> = cashbook_entries::Entity::find()
        .select_only()
        .columns([
            cashbook_entries::Column::Id,
            cashbook_entries::Column::Debit,
            cashbook_entries::Column::Credit,
            cashbook_entries::Column::Balance,
        ])
        .order_by_asc(cashbook_entries::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, debit, credit, balance)| BalanceRow {
            id,
            debit,
            credit,
            balance,
        })
        .collect())
}

async fn last_balance<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let last = cashbook_entries::Entity::find()
        .order_by_desc(cashbook_entries::Column::Id)
        .one(conn)
        .await?;
    Ok(last.map_or(0, |e| e.balance))
}

async fn write_balances<C: ConnectionTrait>(conn: &C, writes: &[BalanceWrite]) -> Result<(), DbErr> {
    for write in writes {
        cashbook_entries::Entity::update_many()
            .col_expr(cashbook_entries::Column::Balance, Expr::value(write.balance))
            .filter(cashbook_entries::Column::Id.eq(write.id))
            .exec(conn)
            .await?;
        debug!(entry_id = write.id, balance = write.balance, "Balance rewritten");
    }
    Ok(())
}

async fn insert<C: ConnectionTrait>(
    conn: &C,
    input: &EntryInput,
    balance: i64,
) -> Result<cashbook_entries::Model, DbErr> {
    cashbook_entries::ActiveModel {
        entry_date: Set(input.entry_date),
        description: Set(input.description.clone()),
        category: Set(input.category.clone()),
        debit: Set(input.debit),
        credit: Set(input.credit),
        balance: Set(balance),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Appends an entry on an open transaction. The caller holds the gate.
pub(crate) async fn append_in<C: ConnectionTrait>(
    conn: &C,
    input: &EntryInput,
) -> Result<cashbook_entries::Model, CashbookError> {
    let balance = LedgerService::plan_append(last_balance(conn).await?, input.debit, input.credit)?;
    let entry = insert(conn, input, balance).await?;

    info!(
        entry_id = entry.id,
        debit = entry.debit,
        credit = entry.credit,
        balance,
        "Cashbook entry appended"
    );
    Ok(entry)
}

/// Appends a reversing credit on an open transaction. The caller holds the gate.
pub(crate) async fn reverse_in<C: ConnectionTrait>(
    conn: &C,
    entry_date: NaiveDate,
    description: &str,
    category: &str,
    amount: i64,
) -> Result<cashbook_entries::Model, CashbookError> {
    let input = EntryInput {
        entry_date,
        description: description.to_string(),
        category: category.to_string(),
        debit: 0,
        credit: amount,
    };
    let previous = last_balance(conn).await?;
    let balance = LedgerService::plan_reversal(previous, amount)?;
    input.validate()?;
    let entry = insert(conn, &input, balance).await?;

    if previous < amount {
        info!(entry_id = entry.id, previous, amount, "Reversal floored at zero");
    }
    info!(entry_id = entry.id, amount, balance, "Cashbook reversal appended");
    Ok(entry)
}
