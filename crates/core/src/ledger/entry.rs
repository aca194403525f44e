//! Cashbook entry domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// The part of a persisted cashbook row the balance engine works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    /// Row id; ids define the chain order.
    pub id: i32,
    /// Incoming amount in minor units.
    pub debit: i64,
    /// Outgoing amount in minor units.
    pub credit: i64,
    /// Stored running balance.
    pub balance: i64,
}

/// Fields of a cashbook entry supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Free text description.
    pub description: String,
    /// Category label such as `iuran` or `operasional`.
    #[serde(default)]
    pub category: String,
    /// Incoming amount.
    #[serde(default)]
    pub debit: i64,
    /// Outgoing amount.
    #[serde(default)]
    pub credit: i64,
}

impl EntryInput {
    /// Checks caller supplied fields before anything is planned.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` for a negative debit or credit and
    /// `LedgerError::MissingDescription` for a blank description.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.debit < 0 || self.credit < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        if self.description.trim().is_empty() {
            return Err(LedgerError::MissingDescription);
        }
        Ok(())
    }
}
