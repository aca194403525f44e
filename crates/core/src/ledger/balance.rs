//! Running balance arithmetic.
//!
//! The opening balance of an empty cashbook is 0 and every row carries
//! `balance[i] = balance[i-1] + debit[i] - credit[i]`.

use serde::{Deserialize, Serialize};

use super::entry::BalanceRow;
use super::error::LedgerError;

/// Computes the balance that follows `previous` after a debit and a credit.
///
/// # Errors
///
/// Returns `LedgerError::BalanceOverflow` if the result does not fit in `i64`.
pub fn next_balance(previous: i64, debit: i64, credit: i64) -> Result<i64, LedgerError> {
    previous
        .checked_add(debit)
        .and_then(|v| v.checked_sub(credit))
        .ok_or(LedgerError::BalanceOverflow)
}

/// Aggregate figures shown above the cashbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of all debits.
    pub total_debit: i64,
    /// Sum of all credits.
    pub total_credit: i64,
    /// Balance of the last row, 0 when empty.
    pub balance: i64,
}

impl LedgerTotals {
    /// Computes totals over rows ordered by id ascending.
    #[must_use]
    pub fn from_rows(rows: &[BalanceRow]) -> Self {
        Self {
            total_debit: rows.iter().map(|r| r.debit).fold(0, i64::saturating_add),
            total_credit: rows.iter().map(|r| r.credit).fold(0, i64::saturating_add),
            balance: rows.last().map_or(0, |r| r.balance),
        }
    }
}

/// A row whose stored balance disagrees with the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMismatch {
    /// Row id.
    pub id: i32,
    /// Balance found in storage.
    pub stored: i64,
    /// Balance the chain requires.
    pub expected: i64,
}

/// Re-derives the chain from 0 and reports every row that disagrees.
///
/// Rows must be ordered by id ascending. Once an arithmetic overflow is hit
/// the remaining rows cannot be checked and are reported with `expected`
/// saturated.
#[must_use]
pub fn verify_chain(rows: &[BalanceRow]) -> Vec<ChainMismatch> {
    let mut running = 0i64;
    let mut mismatches = Vec::new();

    for row in rows {
        running = next_balance(running, row.debit, row.credit).unwrap_or(i64::MAX);
        if row.balance != running {
            mismatches.push(ChainMismatch {
                id: row.id,
                stored: row.balance,
                expected: running,
            });
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, debit: i64, credit: i64, balance: i64) -> BalanceRow {
        BalanceRow {
            id,
            debit,
            credit,
            balance,
        }
    }

    #[test]
    fn test_next_balance() {
        assert_eq!(next_balance(0, 100, 0), Ok(100));
        assert_eq!(next_balance(100, 0, 250), Ok(-150));
        assert_eq!(
            next_balance(i64::MAX, 1, 0),
            Err(LedgerError::BalanceOverflow)
        );
    }

    #[test]
    fn test_totals_use_last_balance() {
        let rows = [row(1, 100, 0, 100), row(2, 0, 30, 70), row(5, 10, 0, 80)];
        let totals = LedgerTotals::from_rows(&rows);
        assert_eq!(totals.total_debit, 110);
        assert_eq!(totals.total_credit, 30);
        assert_eq!(totals.balance, 80);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(LedgerTotals::from_rows(&[]), LedgerTotals::default());
    }

    #[test]
    fn test_verify_chain_reports_drift() {
        let rows = [row(1, 100, 0, 100), row(2, 0, 30, 60), row(3, 5, 0, 75)];
        let mismatches = verify_chain(&rows);
        assert_eq!(
            mismatches,
            vec![ChainMismatch {
                id: 2,
                stored: 60,
                expected: 70
            }]
        );
    }

    #[test]
    fn test_verify_chain_accepts_consistent_rows() {
        let rows = [row(1, 100, 0, 100), row(4, 0, 130, -30)];
        assert!(verify_chain(&rows).is_empty());
    }
}
