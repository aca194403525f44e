//! Ledger error types.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Debit or credit is negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Description is blank.
    #[error("Entry description is required")]
    MissingDescription,

    /// Reversal amount is not positive.
    #[error("Reversal amount must be positive")]
    InvalidReversal,

    // ========== Lookup Errors ==========
    /// No entry with the given id.
    #[error("Cashbook entry not found: {0}")]
    EntryNotFound(i32),

    // ========== Arithmetic Errors ==========
    /// Running balance left the representable range.
    #[error("Running balance overflow")]
    BalanceOverflow,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::InvalidReversal => "INVALID_REVERSAL",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::BalanceOverflow => "BALANCE_OVERFLOW",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeAmount | Self::MissingDescription | Self::InvalidReversal => 400,
            Self::EntryNotFound(_) => 404,
            Self::BalanceOverflow => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(LedgerError::EntryNotFound(3).error_code(), "ENTRY_NOT_FOUND");
        assert_eq!(LedgerError::BalanceOverflow.error_code(), "BALANCE_OVERFLOW");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::MissingDescription.http_status_code(), 400);
        assert_eq!(LedgerError::EntryNotFound(1).http_status_code(), 404);
        assert_eq!(LedgerError::BalanceOverflow.http_status_code(), 422);
    }
}
