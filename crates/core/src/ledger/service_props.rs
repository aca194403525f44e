//! Property-based tests for LedgerService.
//!
//! Feature: cashbook-ledger
//! - Property 1: Append Prefix Sums
//! - Property 2: Update Re-chains Later Rows
//! - Property 3: Delete Behaves As If Never Inserted
//! - Property 4: Reversal Floor

use proptest::prelude::*;

use super::balance::verify_chain;
use super::entry::BalanceRow;
use super::service::{BalanceWrite, LedgerService};

/// Strategy to generate a (debit, credit) pair of minor-unit amounts.
fn amount_pair() -> impl Strategy<Value = (i64, i64)> {
    prop_oneof![
        (1i64..10_000_000i64).prop_map(|d| (d, 0)),
        (1i64..10_000_000i64).prop_map(|c| (0, c)),
        (0i64..1_000_000i64, 0i64..1_000_000i64),
    ]
}

/// Builds a chain by repeated appends, with ids that skip values like a
/// table with deleted rows would.
fn append_all(amounts: &[(i64, i64)]) -> Vec<BalanceRow> {
    let mut rows: Vec<BalanceRow> = Vec::with_capacity(amounts.len());
    for (i, &(debit, credit)) in amounts.iter().enumerate() {
        let last = rows.last().map_or(0, |r| r.balance);
        let balance = LedgerService::plan_append(last, debit, credit).unwrap();
        rows.push(BalanceRow {
            id: i32::try_from(i * 2 + 1).unwrap(),
            debit,
            credit,
            balance,
        });
    }
    rows
}

fn apply(rows: &mut [BalanceRow], writes: &[BalanceWrite]) {
    for write in writes {
        let row = rows.iter_mut().find(|r| r.id == write.id).unwrap();
        row.balance = write.balance;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Append Prefix Sums
    // =========================================================================

    /// Property 1.1: Appended balances equal prefix sums of debit - credit.
    #[test]
    fn prop_append_balances_are_prefix_sums(
        amounts in prop::collection::vec(amount_pair(), 1..40),
    ) {
        let rows = append_all(&amounts);

        let mut sum = 0i64;
        for (row, (debit, credit)) in rows.iter().zip(&amounts) {
            sum += debit - credit;
            prop_assert_eq!(row.balance, sum);
        }
        prop_assert!(verify_chain(&rows).is_empty());
    }

    // =========================================================================
    // Property 2: Update Re-chains Later Rows
    // =========================================================================

    /// Property 2.1: Editing row k leaves rows before k untouched and every
    /// row from k onward satisfies the chain.
    #[test]
    fn prop_update_rechains_suffix(
        amounts in prop::collection::vec(amount_pair(), 1..30),
        pick in any::<prop::sample::Index>(),
        (debit, credit) in amount_pair(),
    ) {
        let mut rows = append_all(&amounts);
        let before = rows.clone();
        let k = pick.index(rows.len());
        let id = rows[k].id;

        let plan = LedgerService::plan_update(&rows, id, debit, credit).unwrap();
        prop_assert_eq!(plan.cascade.len(), rows.len() - k - 1);

        rows[k].debit = debit;
        rows[k].credit = credit;
        rows[k].balance = plan.balance;
        apply(&mut rows, &plan.cascade);

        prop_assert_eq!(&rows[..k], &before[..k]);
        prop_assert!(verify_chain(&rows).is_empty());
    }

    // =========================================================================
    // Property 3: Delete Behaves As If Never Inserted
    // =========================================================================

    /// Property 3.1: Deleting row k yields the balances of a chain that never
    /// contained it.
    #[test]
    fn prop_delete_matches_chain_without_row(
        amounts in prop::collection::vec(amount_pair(), 1..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut rows = append_all(&amounts);
        let k = pick.index(rows.len());
        let id = rows[k].id;

        let writes = LedgerService::plan_delete(&rows, id).unwrap();
        rows.remove(k);
        apply(&mut rows, &writes);

        let mut remaining = amounts.clone();
        remaining.remove(k);
        let expected: Vec<i64> = append_all(&remaining).iter().map(|r| r.balance).collect();
        let actual: Vec<i64> = rows.iter().map(|r| r.balance).collect();

        prop_assert_eq!(actual, expected);
        prop_assert!(verify_chain(&rows).is_empty());
    }

    // =========================================================================
    // Property 4: Reversal Floor
    // =========================================================================

    /// Property 4.1: Reversing more than the balance yields exactly 0.
    #[test]
    fn prop_reversal_beyond_balance_is_zero(
        balance in 0i64..10_000_000i64,
        extra in 1i64..10_000_000i64,
    ) {
        let result = LedgerService::plan_reversal(balance, balance + extra).unwrap();
        prop_assert_eq!(result, 0);
    }

    /// Property 4.2: Reversing within the balance subtracts the amount.
    #[test]
    fn prop_reversal_within_balance_subtracts(
        balance in 1i64..10_000_000i64,
        pick in any::<prop::sample::Index>(),
    ) {
        let amount = i64::try_from(pick.index(usize::try_from(balance).unwrap())).unwrap() + 1;
        let result = LedgerService::plan_reversal(balance, amount).unwrap();
        prop_assert_eq!(result, balance - amount);
        prop_assert!(result >= 0);
    }
}
