//! Running-balance cashbook logic.
//!
//! This module implements the core ledger functionality:
//! - Cashbook entries and caller input validation
//! - Running balance arithmetic and chain verification
//! - Planners for append, update, delete and reversal
//! - Error types for ledger operations
//!
//! Every planner works on rows ordered by id ascending and returns the balance
//! writes a repository must persist. Nothing here touches storage.

pub mod balance;
pub mod entry;
pub mod error;
pub mod service;

#[cfg(test)]
mod service_props;

pub use balance::{ChainMismatch, LedgerTotals, next_balance, verify_chain};
pub use entry::{BalanceRow, EntryInput};
pub use error::LedgerError;
pub use service::{BalanceWrite, LedgerService, UpdatePlan};
