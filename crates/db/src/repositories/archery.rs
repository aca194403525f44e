//! Archery (panahan) repository.
//!
//! A game is created with every end and arrow already in place, scored 0.
//! Saving arrows rewrites the affected end totals and the game total in the
//! same transaction.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use orgkas_core::archery::{
    self, ArrowScore, ArrowSlot, EndSlot, ScoreTotals, ScoringError, validate_batch,
};
use orgkas_shared::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::db_app_error;
use crate::entities::{archery_arrows, archery_ends, archery_games, members};

/// Error types for archery operations.
#[derive(Debug, thiserror::Error)]
pub enum ArcheryError {
    /// Invalid scoring input.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Game not found.
    #[error("Game not found: {0}")]
    GameNotFound(i32),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(i32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ArcheryError> for AppError {
    fn from(err: ArcheryError) -> Self {
        match err {
            ArcheryError::Scoring(e) => Self::Validation(e.to_string()),
            e @ (ArcheryError::GameNotFound(_) | ArcheryError::MemberNotFound(_)) => {
                Self::NotFound(e.to_string())
            }
            ArcheryError::Database(e) => db_app_error(&e),
        }
    }
}

/// Input for creating a game.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameInput {
    /// Member shooting.
    pub member_id: i32,
    /// Date of play, today when omitted.
    #[serde(default)]
    pub played_on: Option<NaiveDate>,
    /// Number of sessions, 2 when omitted.
    #[serde(default)]
    pub session_count: Option<i32>,
    /// Free text.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A game with the member's name.
#[derive(Debug, Clone, Serialize)]
pub struct GameWithMember {
    /// The game.
    #[serde(flatten)]
    pub game: archery_games::Model,
    /// Member name.
    pub member_name: Option<String>,
}

/// One end of a session with its arrows.
#[derive(Debug, Clone, Serialize)]
pub struct EndView {
    /// End number.
    #[serde(rename = "shoot_number")]
    pub end_number: i32,
    /// Sum of the end's arrows.
    pub total_score: i64,
    /// Arrows in order.
    pub arrows: Vec<archery_arrows::Model>,
}

/// A session of a game grouped by end.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Session number.
    pub session_number: i32,
    /// Sum of the session's ends.
    pub session_total: i64,
    /// Ends in order.
    pub ends: Vec<EndView>,
}

/// Archery repository.
#[derive(Debug, Clone)]
pub struct ArcheryRepository {
    db: DatabaseConnection,
}

impl ArcheryRepository {
    /// Creates a new archery repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists games newest first, optionally for one member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_games(
        &self,
        member_id: Option<i32>,
    ) -> Result<Vec<GameWithMember>, ArcheryError> {
        let mut query = archery_games::Entity::find().find_also_related(members::Entity);
        if let Some(member_id) = member_id {
            query = query.filter(archery_games::Column::MemberId.eq(member_id));
        }
        let rows = query
            .order_by_desc(archery_games::Column::PlayedOn)
            .order_by_desc(archery_games::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(game, member)| GameWithMember {
                game,
                member_name: member.map(|m| m.name),
            })
            .collect())
    }

    /// Finds a game by id.
    ///
    /// # Errors
    ///
    /// Returns `ArcheryError::GameNotFound` if the game does not exist.
    pub async fn find_game(&self, id: i32) -> Result<archery_games::Model, ArcheryError> {
        find_game(&self.db, id).await
    }

    /// Creates a game with every end and arrow scored 0.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::InvalidSessionCount`,
    /// `ArcheryError::MemberNotFound`, or a database error.
    pub async fn create_game(
        &self,
        input: CreateGameInput,
    ) -> Result<archery_games::Model, ArcheryError> {
        let sessions = archery::session_count(input.session_count)?;

        let txn = self.db.begin().await?;
        if members::Entity::find_by_id(input.member_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(ArcheryError::MemberNotFound(input.member_id));
        }

        let now = Utc::now();
        let game = archery_games::ActiveModel {
            member_id: Set(input.member_id),
            played_on: Set(input.played_on.unwrap_or_else(|| now.date_naive())),
            session_count: Set(sessions),
            total_score: Set(0),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let ends = archery::end_slots(sessions).map(|slot| archery_ends::ActiveModel {
            game_id: Set(game.id),
            session_number: Set(slot.session),
            end_number: Set(slot.end),
            total_score: Set(0),
            updated_at: Set(now),
            ..Default::default()
        });
        archery_ends::Entity::insert_many(ends).exec(&txn).await?;

        for session in 1..=sessions {
            let arrows = archery::arrow_slots(sessions)
                .filter(|slot| slot.session == session)
                .map(|slot| archery_arrows::ActiveModel {
                    game_id: Set(game.id),
                    session_number: Set(slot.session),
                    end_number: Set(slot.end),
                    arrow_number: Set(slot.arrow),
                    score: Set(0),
                    display_value: Set("0".to_string()),
                    updated_at: Set(now),
                    ..Default::default()
                });
            archery_arrows::Entity::insert_many(arrows).exec(&txn).await?;
        }
        txn.commit().await?;

        info!(game_id = game.id, member_id = game.member_id, sessions, "Archery game created");
        Ok(game)
    }

    /// Saves the arrows of one end and returns the end, session and game totals.
    ///
    /// # Errors
    ///
    /// Returns a scoring error for scores outside 0..=10 or arrows outside
    /// the end, `ArcheryError::GameNotFound`, or a database error.
    pub async fn save_end(
        &self,
        game_id: i32,
        end: EndSlot,
        arrows: &[ArrowScore],
    ) -> Result<ScoreTotals, ArcheryError> {
        let txn = self.db.begin().await?;
        let game = find_game(&txn, game_id).await?;

        validate_batch(arrows, game.session_count)?;
        if let Some(outside) = arrows
            .iter()
            .find(|a| a.slot.session != end.session || a.slot.end != end.end)
        {
            return Err(ScoringError::InvalidPosition {
                session: outside.slot.session,
                end: outside.slot.end,
                arrow: outside.slot.arrow,
            }
            .into());
        }

        write_arrows(&txn, game_id, arrows).await?;
        let scores = load_scores(&txn, game_id).await?;
        let totals = ScoreTotals::compute(&scores, end);
        store_totals(&txn, game_id, &scores, [end]).await?;
        txn.commit().await?;

        info!(
            game_id,
            session = end.session,
            end = end.end,
            end_total = totals.end_total,
            "Archery end saved"
        );
        Ok(totals)
    }

    /// Saves arrows anywhere in a game and returns the new game total.
    ///
    /// # Errors
    ///
    /// Returns a scoring error, `ArcheryError::GameNotFound`, or a database
    /// error.
    pub async fn save_shots(&self, game_id: i32, arrows: &[ArrowScore]) -> Result<i64, ArcheryError> {
        let txn = self.db.begin().await?;
        let game = find_game(&txn, game_id).await?;
        validate_batch(arrows, game.session_count)?;

        write_arrows(&txn, game_id, arrows).await?;
        let scores = load_scores(&txn, game_id).await?;
        let touched: BTreeSet<EndSlot> = arrows
            .iter()
            .map(|a| EndSlot {
                session: a.slot.session,
                end: a.slot.end,
            })
            .collect();
        let total = store_totals(&txn, game_id, &scores, touched).await?;
        txn.commit().await?;

        Ok(total)
    }

    /// Lists every arrow of a game by session, end and arrow.
    ///
    /// # Errors
    ///
    /// Returns `ArcheryError::GameNotFound` or a database error.
    pub async fn shots(&self, game_id: i32) -> Result<Vec<archery_arrows::Model>, ArcheryError> {
        find_game(&self.db, game_id).await?;
        Ok(arrows_of(&self.db, game_id, None).await?)
    }

    /// Loads one session grouped by end.
    ///
    /// # Errors
    ///
    /// Returns `ArcheryError::GameNotFound`, a scoring error for a session
    /// outside the game, or a database error.
    pub async fn session(&self, game_id: i32, session: i32) -> Result<SessionView, ArcheryError> {
        let game = find_game(&self.db, game_id).await?;
        if !(1..=game.session_count).contains(&session) {
            return Err(ScoringError::InvalidPosition {
                session,
                end: 1,
                arrow: 1,
            }
            .into());
        }

        let end_rows = archery_ends::Entity::find()
            .filter(archery_ends::Column::GameId.eq(game_id))
            .filter(archery_ends::Column::SessionNumber.eq(session))
            .order_by_asc(archery_ends::Column::EndNumber)
            .all(&self.db)
            .await?;
        let arrows = arrows_of(&self.db, game_id, Some(session)).await?;

        let ends: Vec<EndView> = end_rows
            .into_iter()
            .map(|end| EndView {
                end_number: end.end_number,
                total_score: end.total_score,
                arrows: arrows
                    .iter()
                    .filter(|a| a.end_number == end.end_number)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(SessionView {
            session_number: session,
            session_total: ends.iter().map(|e| e.total_score).sum(),
            ends,
        })
    }

    /// Deletes a game with its ends and arrows.
    ///
    /// # Errors
    ///
    /// Returns `ArcheryError::GameNotFound` or a database error.
    pub async fn delete_game(&self, id: i32) -> Result<(), ArcheryError> {
        let result = archery_games::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ArcheryError::GameNotFound(id));
        }
        info!(game_id = id, "Archery game deleted");
        Ok(())
    }
}

async fn find_game<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<archery_games::Model, ArcheryError> {
    archery_games::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(ArcheryError::GameNotFound(id))
}

async fn arrows_of<C: ConnectionTrait>(
    conn: &C,
    game_id: i32,
    session: Option<i32>,
) -> Result<Vec<archery_arrows::Model>, DbErr> {
    let mut query = archery_arrows::Entity::find().filter(archery_arrows::Column::GameId.eq(game_id));
    if let Some(session) = session {
        query = query.filter(archery_arrows::Column::SessionNumber.eq(session));
    }
    query
        .order_by_asc(archery_arrows::Column::SessionNumber)
        .order_by_asc(archery_arrows::Column::EndNumber)
        .order_by_asc(archery_arrows::Column::ArrowNumber)
        .all(conn)
        .await
}

async fn write_arrows<C: ConnectionTrait>(
    conn: &C,
    game_id: i32,
    arrows: &[ArrowScore],
) -> Result<(), DbErr> {
    let now = Utc::now();
    for arrow in arrows {
        archery_arrows::Entity::update_many()
            .col_expr(archery_arrows::Column::Score, Expr::value(arrow.score))
            .col_expr(archery_arrows::Column::DisplayValue, Expr::value(arrow.display()))
            .col_expr(archery_arrows::Column::UpdatedAt, Expr::value(now))
            .filter(archery_arrows::Column::GameId.eq(game_id))
            .filter(archery_arrows::Column::SessionNumber.eq(arrow.slot.session))
            .filter(archery_arrows::Column::EndNumber.eq(arrow.slot.end))
            .filter(archery_arrows::Column::ArrowNumber.eq(arrow.slot.arrow))
            .exec(conn)
            .await?;
    }
    Ok(())
}

async fn load_scores<C: ConnectionTrait>(
    conn: &C,
    game_id: i32,
) -> Result<Vec<(ArrowSlot, i32)>, DbErr> {
    let rows: Vec<(i32, i32, i32, i32)> = archery_arrows::Entity::find()
        .select_only()
        .columns([
            archery_arrows::Column::SessionNumber,
            archery_arrows::Column::EndNumber,
            archery_arrows::Column::ArrowNumber,
            archery_arrows::Column::Score,
        ])
        .filter(archery_arrows::Column::GameId.eq(game_id))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(session, end, arrow, score)| (ArrowSlot { session, end, arrow }, score))
        .collect())
}

/// Writes the totals of `ends` and of the game, returning the game total.
async fn store_totals<C, I>(
    conn: &C,
    game_id: i32,
    scores: &[(ArrowSlot, i32)],
    ends: I,
) -> Result<i64, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = EndSlot>,
{
    let now = Utc::now();
    let game_total: i64 = scores.iter().map(|(_, score)| i64::from(*score)).sum();
    for end in ends {
        let totals = ScoreTotals::compute(scores, end);
        archery_ends::Entity::update_many()
            .col_expr(archery_ends::Column::TotalScore, Expr::value(totals.end_total))
            .col_expr(archery_ends::Column::UpdatedAt, Expr::value(now))
            .filter(archery_ends::Column::GameId.eq(game_id))
            .filter(archery_ends::Column::SessionNumber.eq(end.session))
            .filter(archery_ends::Column::EndNumber.eq(end.end))
            .exec(conn)
            .await?;
    }

    archery_games::Entity::update_many()
        .col_expr(archery_games::Column::TotalScore, Expr::value(game_total))
        .col_expr(archery_games::Column::UpdatedAt, Expr::value(now))
        .filter(archery_games::Column::Id.eq(game_id))
        .exec(conn)
        .await?;
    Ok(game_total)
}
