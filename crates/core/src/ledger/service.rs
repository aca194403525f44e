//! Ledger service planning balance writes for cashbook mutations.
//!
//! Planners are pure: they take the current rows (ordered by id ascending)
//! and return the balances a repository must persist, inside one transaction,
//! for the chain to stay consistent.

use serde::{Deserialize, Serialize};

use super::balance::next_balance;
use super::entry::BalanceRow;
use super::error::LedgerError;

/// A balance a repository must store on an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceWrite {
    /// Row id.
    pub id: i32,
    /// New running balance.
    pub balance: i64,
}

/// Result of planning an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Balance of the edited row itself.
    pub balance: i64,
    /// Balances of every later row, in id order.
    pub cascade: Vec<BalanceWrite>,
}

/// Stateless ledger planner.
pub struct LedgerService;

impl LedgerService {
    /// Plans the balance of a new row appended after `last_balance`.
    ///
    /// `last_balance` is the balance of the highest-id row, or 0 when empty.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NegativeAmount` for negative amounts and
    /// `LedgerError::BalanceOverflow` on arithmetic overflow.
    pub fn plan_append(last_balance: i64, debit: i64, credit: i64) -> Result<i64, LedgerError> {
        if debit < 0 || credit < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        next_balance(last_balance, debit, credit)
    }

    /// Plans an edit of row `id` to the new `debit` and `credit`.
    ///
    /// The edited row chains from the row before it (or 0), then every later
    /// row is recomputed in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` if `id` is not in `rows`.
    pub fn plan_update(
        rows: &[BalanceRow],
        id: i32,
        debit: i64,
        credit: i64,
    ) -> Result<UpdatePlan, LedgerError> {
        if debit < 0 || credit < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        let index = position_of(rows, id)?;
        let previous = if index == 0 { 0 } else { rows[index - 1].balance };

        let balance = next_balance(previous, debit, credit)?;
        let cascade = chain_from(balance, &rows[index + 1..])?;

        Ok(UpdatePlan { balance, cascade })
    }

    /// Plans the removal of row `id`.
    ///
    /// Returns the balances of every later row recomputed from the balance of
    /// the row that preceded the removed one.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` if `id` is not in `rows`.
    pub fn plan_delete(rows: &[BalanceRow], id: i32) -> Result<Vec<BalanceWrite>, LedgerError> {
        let index = position_of(rows, id)?;
        let previous = if index == 0 { 0 } else { rows[index - 1].balance };

        chain_from(previous, &rows[index + 1..])
    }

    /// Plans the balance of a reversing credit of `amount`.
    ///
    /// The balance is floored at 0: reversing more than the current balance
    /// leaves exactly 0.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidReversal` when `amount` is not positive.
    pub fn plan_reversal(last_balance: i64, amount: i64) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidReversal);
        }
        Ok(last_balance.saturating_sub(amount).max(0))
    }

    /// Recomputes the whole chain from 0 and returns writes for rows whose
    /// stored balance is wrong.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BalanceOverflow` on arithmetic overflow.
    pub fn plan_rechain(rows: &[BalanceRow]) -> Result<Vec<BalanceWrite>, LedgerError> {
        Ok(chain_from(0, rows)?
            .into_iter()
            .zip(rows)
            .filter(|(write, row)| write.balance != row.balance)
            .map(|(write, _)| write)
            .collect())
    }
}

fn position_of(rows: &[BalanceRow], id: i32) -> Result<usize, LedgerError> {
    rows.iter()
        .position(|r| r.id == id)
        .ok_or(LedgerError::EntryNotFound(id))
}

fn chain_from(start: i64, rows: &[BalanceRow]) -> Result<Vec<BalanceWrite>, LedgerError> {
    let mut running = start;
    rows.iter()
        .map(|row| {
            running = next_balance(running, row.debit, row.credit)?;
            Ok(BalanceWrite {
                id: row.id,
                balance: running,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(amounts: &[(i64, i64)]) -> Vec<BalanceRow> {
        let mut balance = 0;
        amounts
            .iter()
            .zip(1..)
            .map(|(&(debit, credit), id)| {
                balance += debit - credit;
                BalanceRow {
                    id,
                    debit,
                    credit,
                    balance,
                }
            })
            .collect()
    }

    #[test]
    fn test_append_to_empty() {
        assert_eq!(LedgerService::plan_append(0, 100_000, 0), Ok(100_000));
    }

    #[test]
    fn test_append_rejects_negative() {
        assert_eq!(
            LedgerService::plan_append(0, -1, 0),
            Err(LedgerError::NegativeAmount)
        );
    }

    #[test]
    fn test_update_first_row_rechains_rest() {
        let rows = chain(&[(100, 0), (0, 40), (10, 0)]);
        let plan = LedgerService::plan_update(&rows, 1, 200, 0).unwrap();

        assert_eq!(plan.balance, 200);
        assert_eq!(
            plan.cascade,
            vec![
                BalanceWrite { id: 2, balance: 160 },
                BalanceWrite { id: 3, balance: 170 },
            ]
        );
    }

    #[test]
    fn test_update_last_row_has_no_cascade() {
        let rows = chain(&[(100, 0), (0, 40)]);
        let plan = LedgerService::plan_update(&rows, 2, 0, 10).unwrap();
        assert_eq!(plan.balance, 90);
        assert!(plan.cascade.is_empty());
    }

    #[test]
    fn test_update_unknown_id() {
        let rows = chain(&[(100, 0)]);
        assert_eq!(
            LedgerService::plan_update(&rows, 9, 1, 0),
            Err(LedgerError::EntryNotFound(9))
        );
    }

    #[test]
    fn test_delete_middle_row() {
        let rows = chain(&[(100, 0), (50, 0), (0, 20)]);
        let writes = LedgerService::plan_delete(&rows, 2).unwrap();
        assert_eq!(writes, vec![BalanceWrite { id: 3, balance: 80 }]);
    }

    #[test]
    fn test_delete_first_row_chains_from_zero() {
        let rows = chain(&[(100, 0), (0, 30)]);
        let writes = LedgerService::plan_delete(&rows, 1).unwrap();
        assert_eq!(writes, vec![BalanceWrite { id: 2, balance: -30 }]);
    }

    #[test]
    fn test_reversal_floor() {
        assert_eq!(LedgerService::plan_reversal(500, 200), Ok(300));
        assert_eq!(LedgerService::plan_reversal(100, 250), Ok(0));
        assert_eq!(LedgerService::plan_reversal(-40, 10), Ok(0));
        assert_eq!(
            LedgerService::plan_reversal(100, 0),
            Err(LedgerError::InvalidReversal)
        );
    }

    #[test]
    fn test_rechain_only_touches_wrong_rows() {
        let mut rows = chain(&[(100, 0), (0, 30), (5, 0)]);
        rows[1].balance = 0;
        rows[2].balance = 5;
        let writes = LedgerService::plan_rechain(&rows).unwrap();
        assert_eq!(
            writes,
            vec![
                BalanceWrite { id: 2, balance: 70 },
                BalanceWrite { id: 3, balance: 75 },
            ]
        );
    }
}
