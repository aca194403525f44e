//! Archery (panahan) game layout and scoring.
//!
//! A game has `session_count` sessions of [`ENDS_PER_SESSION`] ends, each end
//! being [`ARROWS_PER_END`] arrows scored 0..=10.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ends shot in one session.
pub const ENDS_PER_SESSION: i32 = 6;
/// Arrows shot in one end.
pub const ARROWS_PER_END: i32 = 6;
/// Sessions a game may have at most.
pub const MAX_SESSIONS: i32 = 10;
/// Sessions a game gets when none is given.
pub const DEFAULT_SESSIONS: i32 = 2;
/// Highest arrow score.
pub const MAX_ARROW_SCORE: i32 = 10;

/// Errors in archery input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// Session count outside 1..=10.
    #[error("Session count must be between 1 and 10, got {0}")]
    InvalidSessionCount(i32),

    /// Arrow score outside 0..=10.
    #[error("Arrow score must be between 0 and 10, got {0}")]
    ScoreOutOfRange(i32),

    /// Arrow position does not exist in the game.
    #[error("No arrow at session {session}, end {end}, arrow {arrow}")]
    InvalidPosition {
        /// Session number.
        session: i32,
        /// End number.
        end: i32,
        /// Arrow number.
        arrow: i32,
    },

    /// No arrows supplied.
    #[error("No arrows supplied")]
    Empty,
}

/// Position of an arrow in a game, all numbers starting at 1.
///
/// On the wire an end is called a shoot, as on the scoresheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArrowSlot {
    /// Session number.
    #[serde(rename = "session_number")]
    pub session: i32,
    /// End number within the session.
    #[serde(rename = "shoot_number")]
    pub end: i32,
    /// Arrow number within the end.
    #[serde(rename = "arrow_number")]
    pub arrow: i32,
}

/// Position of an end in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndSlot {
    /// Session number.
    pub session: i32,
    /// End number within the session.
    pub end: i32,
}

/// Resolves the session count of a new game.
///
/// # Errors
///
/// Returns `ScoringError::InvalidSessionCount` outside 1..=10.
pub fn session_count(requested: Option<i32>) -> Result<i32, ScoringError> {
    let count = requested.unwrap_or(DEFAULT_SESSIONS);
    if (1..=MAX_SESSIONS).contains(&count) {
        Ok(count)
    } else {
        Err(ScoringError::InvalidSessionCount(count))
    }
}

/// Every end of a game in shooting order.
pub fn end_slots(session_count: i32) -> impl Iterator<Item = EndSlot> {
    (1..=session_count)
        .flat_map(|session| (1..=ENDS_PER_SESSION).map(move |end| EndSlot { session, end }))
}

/// Every arrow of a game in shooting order.
pub fn arrow_slots(session_count: i32) -> impl Iterator<Item = ArrowSlot> {
    end_slots(session_count).flat_map(|e| {
        (1..=ARROWS_PER_END).map(move |arrow| ArrowSlot {
            session: e.session,
            end: e.end,
            arrow,
        })
    })
}

/// A scored arrow as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowScore {
    /// Position.
    #[serde(flatten)]
    pub slot: ArrowSlot,
    /// Points, 0..=10.
    pub score: i32,
    /// Label shown on the scoresheet, e.g. `X` or `M`.
    #[serde(default)]
    pub display_value: Option<String>,
}

impl ArrowScore {
    /// Validates the arrow against a game with `session_count` sessions.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::ScoreOutOfRange` or `ScoringError::InvalidPosition`.
    pub fn validate(&self, session_count: i32) -> Result<(), ScoringError> {
        if !(0..=MAX_ARROW_SCORE).contains(&self.score) {
            return Err(ScoringError::ScoreOutOfRange(self.score));
        }
        let ArrowSlot {
            session,
            end,
            arrow,
        } = self.slot;
        let in_game = (1..=session_count).contains(&session)
            && (1..=ENDS_PER_SESSION).contains(&end)
            && (1..=ARROWS_PER_END).contains(&arrow);
        if !in_game {
            return Err(ScoringError::InvalidPosition {
                session,
                end,
                arrow,
            });
        }
        Ok(())
    }

    /// Label to store, defaulting to the score as text.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.display_value {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => self.score.to_string(),
        }
    }
}

/// Validates a batch of arrows.
///
/// # Errors
///
/// Returns `ScoringError::Empty` for an empty batch or the first invalid arrow.
pub fn validate_batch(arrows: &[ArrowScore], session_count: i32) -> Result<(), ScoringError> {
    if arrows.is_empty() {
        return Err(ScoringError::Empty);
    }
    arrows.iter().try_for_each(|a| a.validate(session_count))
}

/// Totals returned after saving an end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTotals {
    /// Total of the saved end.
    #[serde(rename = "shootTotal")]
    pub end_total: i64,
    /// Total of the session the end belongs to.
    #[serde(rename = "sessionTotal")]
    pub session_total: i64,
    /// Total of the whole game.
    #[serde(rename = "gameTotal")]
    pub game_total: i64,
}

impl ScoreTotals {
    /// Sums arrow scores for the end at `slot`, its session and the game.
    #[must_use]
    pub fn compute(arrows: &[(ArrowSlot, i32)], slot: EndSlot) -> Self {
        let mut totals = Self::default();
        for (at, score) in arrows {
            let score = i64::from(*score);
            totals.game_total += score;
            if at.session == slot.session {
                totals.session_total += score;
                if at.end == slot.end {
                    totals.end_total += score;
                }
            }
        }
        totals
    }
}
