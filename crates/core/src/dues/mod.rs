//! Dues (iuran) rules.
//!
//! A dues row marked paid is mirrored in the cashbook as a debit. Changing or
//! removing a paid row posts a reversing credit, so the cashbook always tells
//! the story of every payment.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cashbook category used for dues postings.
pub const DUES_CATEGORY: &str = "iuran";

/// Payment status of a dues row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuesStatus {
    /// Paid.
    #[default]
    Lunas,
    /// Not yet paid.
    BelumLunas,
}

impl DuesStatus {
    /// Returns the status as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lunas => "lunas",
            Self::BelumLunas => "belum_lunas",
        }
    }

    /// Returns true for a paid row.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Lunas)
    }
}

impl FromStr for DuesStatus {
    type Err = DuesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lunas" => Ok(Self::Lunas),
            "belum_lunas" => Ok(Self::BelumLunas),
            other => Err(DuesError::InvalidStatus(other.to_string())),
        }
    }
}

/// How often a tariff is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every month.
    #[default]
    Bulanan,
    /// Once a year.
    Tahunan,
    /// Once per membership.
    SeumurHidup,
}

impl Frequency {
    /// Returns the frequency as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bulanan => "bulanan",
            Self::Tahunan => "tahunan",
            Self::SeumurHidup => "seumur_hidup",
        }
    }
}

impl FromStr for Frequency {
    type Err = DuesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulanan" => Ok(Self::Bulanan),
            "tahunan" => Ok(Self::Tahunan),
            "seumur_hidup" => Ok(Self::SeumurHidup),
            other => Err(DuesError::InvalidFrequency(other.to_string())),
        }
    }
}

/// Errors in dues input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuesError {
    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(i32),

    /// Year outside a sensible range.
    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    /// Amount is negative.
    #[error("Dues amount cannot be negative")]
    NegativeAmount,

    /// Unknown status string.
    #[error("Unknown dues status: {0}")]
    InvalidStatus(String),

    /// Unknown frequency string.
    #[error("Unknown frequency: {0}")]
    InvalidFrequency(String),
}

/// The fields of a dues row that decide its cashbook postings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuesState {
    /// Payment status.
    pub status: DuesStatus,
    /// Amount in minor units.
    pub amount: i64,
    /// Free text notes, used in the cashbook description.
    pub notes: String,
    /// Payment date, if recorded.
    pub paid_on: Option<NaiveDate>,
}

impl DuesState {
    fn counts(&self) -> bool {
        self.status.is_paid() && self.amount > 0
    }
}

/// Direction of a cashbook posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingKind {
    /// Appended as a debit.
    Payment,
    /// Appended as a reversing credit.
    Reversal,
}

/// A cashbook entry a dues change requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashPosting {
    /// Payment or reversal.
    pub kind: PostingKind,
    /// Amount in minor units, always positive.
    pub amount: i64,
    /// Booking date.
    pub entry_date: NaiveDate,
    /// Cashbook description.
    pub description: String,
}

impl CashPosting {
    fn payment(state: &DuesState, today: NaiveDate) -> Self {
        Self {
            kind: PostingKind::Payment,
            amount: state.amount,
            entry_date: state.paid_on.unwrap_or(today),
            description: format!("Iuran bulanan - {}", state.notes),
        }
    }

    fn reversal(state: &DuesState, today: NaiveDate) -> Self {
        Self {
            kind: PostingKind::Reversal,
            amount: state.amount,
            entry_date: today,
            description: format!("Pembatalan iuran - {}", state.notes),
        }
    }
}

/// Validates the period and amount of a dues row.
///
/// # Errors
///
/// Returns the first `DuesError` found.
pub fn validate(month: i32, year: i32, amount: i64) -> Result<(), DuesError> {
    if !(1..=12).contains(&month) {
        return Err(DuesError::InvalidMonth(month));
    }
    if !(1900..=9999).contains(&year) {
        return Err(DuesError::InvalidYear(year));
    }
    if amount < 0 {
        return Err(DuesError::NegativeAmount);
    }
    Ok(())
}

/// Postings for a newly created dues row.
#[must_use]
pub fn postings_for_create(state: &DuesState, today: NaiveDate) -> Vec<CashPosting> {
    if state.counts() {
        vec![CashPosting::payment(state, today)]
    } else {
        Vec::new()
    }
}

/// Postings for an edited dues row.
///
/// A paid row that stops counting is reversed; a row that starts counting is
/// posted; a paid row whose amount changed is reversed and posted again.
#[must_use]
pub fn postings_for_update(
    before: &DuesState,
    after: &DuesState,
    today: NaiveDate,
) -> Vec<CashPosting> {
    match (before.counts(), after.counts()) {
        (true, false) => vec![CashPosting::reversal(before, today)],
        (false, true) => vec![CashPosting::payment(after, today)],
        (true, true) if before.amount != after.amount => vec![
            CashPosting::reversal(before, today),
            CashPosting::payment(after, today),
        ],
        _ => Vec::new(),
    }
}

/// Postings for a deleted dues row.
#[must_use]
pub fn postings_for_delete(before: &DuesState, today: NaiveDate) -> Vec<CashPosting> {
    if before.counts() {
        vec![CashPosting::reversal(before, today)]
    } else {
        Vec::new()
    }
}
