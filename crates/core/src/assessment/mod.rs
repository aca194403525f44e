//! Member assessment (penilaian) scoring.
//!
//! Scores and weights are decimals. The recap for a member is the plain mean
//! of the period's scores; the weighted average `Σ(score·weight) / Σ(weight)`
//! is reported next to it. Both are rounded to two places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest score an assessment may carry.
pub const MAX_SCORE: Decimal = Decimal::ONE_HUNDRED;

/// Errors in assessment input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    /// Score outside 0..=100.
    #[error("Score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(Decimal),

    /// Weight is zero or negative.
    #[error("Weight must be positive, got {0}")]
    InvalidWeight(Decimal),

    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(i32),

    /// Assessment type name is blank.
    #[error("Assessment type name is required")]
    MissingName,
}

/// Validates a score.
///
/// # Errors
///
/// Returns `AssessmentError::ScoreOutOfRange` outside 0..=100.
pub fn validate_score(score: Decimal) -> Result<(), AssessmentError> {
    if score < Decimal::ZERO || score > MAX_SCORE {
        return Err(AssessmentError::ScoreOutOfRange(score));
    }
    Ok(())
}

/// Validates an assessment period month.
///
/// # Errors
///
/// Returns `AssessmentError::InvalidMonth` outside 1..=12.
pub fn validate_month(month: i32) -> Result<(), AssessmentError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AssessmentError::InvalidMonth(month))
    }
}

/// Validates an assessment type definition.
///
/// # Errors
///
/// Returns `AssessmentError::MissingName` or `AssessmentError::InvalidWeight`.
pub fn validate_type(name: &str, weight: Decimal) -> Result<(), AssessmentError> {
    if name.trim().is_empty() {
        return Err(AssessmentError::MissingName);
    }
    if weight <= Decimal::ZERO {
        return Err(AssessmentError::InvalidWeight(weight));
    }
    Ok(())
}

/// One score with the weight of its assessment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedScore {
    /// Score.
    pub score: Decimal,
    /// Weight of the assessment type.
    pub weight: Decimal,
}

/// Summary of a member's scores for a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Number of scores.
    pub count: usize,
    /// Mean of the scores, 0 when there are none.
    pub average: Decimal,
    /// Mean weighted by assessment type, 0 when there are no scores.
    pub weighted_average: Decimal,
}

/// Summarizes `scores` into a count, a mean and a weighted mean.
///
/// Entries with a non-positive weight are left out of the weighted mean only.
#[must_use]
pub fn summarize(scores: &[WeightedScore]) -> ScoreSummary {
    if scores.is_empty() {
        return ScoreSummary::default();
    }

    let total: Decimal = scores.iter().map(|s| s.score).sum();
    let average = (total / Decimal::from(scores.len())).round_dp(2);

    let counted: Vec<_> = scores.iter().filter(|s| s.weight > Decimal::ZERO).collect();
    let total_weight: Decimal = counted.iter().map(|s| s.weight).sum();
    let weighted_average = if total_weight.is_zero() {
        Decimal::ZERO
    } else {
        let weighted: Decimal = counted.iter().map(|s| s.score * s.weight).sum();
        (weighted / total_weight).round_dp(2)
    };

    ScoreSummary {
        count: scores.len(),
        average,
        weighted_average,
    }
}
