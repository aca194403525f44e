//! Integration tests for archery games.

mod common;

use orgkas_core::archery::{ArrowScore, ArrowSlot, EndSlot, ScoringError};
use orgkas_db::repositories::{ArcheryError, ArcheryRepository, CreateGameInput};

use common::{create_member, date, setup};

fn game(member_id: i32, session_count: Option<i32>) -> CreateGameInput {
    CreateGameInput {
        member_id,
        played_on: Some(date(2025, 6, 7)),
        session_count,
        notes: None,
    }
}

fn end_arrows(session: i32, end: i32, scores: [i32; 6]) -> Vec<ArrowScore> {
    scores
        .iter()
        .zip(1..)
        .map(|(&score, arrow)| ArrowScore {
            slot: ArrowSlot {
                session,
                end,
                arrow,
            },
            score,
            display_value: None,
        })
        .collect()
}

#[tokio::test]
async fn test_create_game_precreates_layout() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;

    let created = repo.create_game(game(member.id, None)).await.expect("game");
    assert_eq!(created.session_count, 2);
    assert_eq!(created.total_score, 0);

    let shots = repo.shots(created.id).await.expect("shots");
    assert_eq!(shots.len(), 72);
    assert!(shots.iter().all(|s| s.score == 0 && s.display_value == "0"));
    assert_eq!(
        (shots[0].session_number, shots[0].end_number, shots[0].arrow_number),
        (1, 1, 1)
    );
    assert_eq!(
        (shots[71].session_number, shots[71].end_number, shots[71].arrow_number),
        (2, 6, 6)
    );
}

#[tokio::test]
async fn test_session_count_bounds() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;

    let err = repo
        .create_game(game(member.id, Some(11)))
        .await
        .expect_err("too many sessions");
    assert!(matches!(
        err,
        ArcheryError::Scoring(ScoringError::InvalidSessionCount(11))
    ));
    assert!(repo.list_games(None).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_save_end_returns_totals() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let g = repo.create_game(game(member.id, None)).await.expect("game");

    let first = EndSlot { session: 1, end: 1 };
    let totals = repo
        .save_end(g.id, first, &end_arrows(1, 1, [10, 9, 9, 8, 7, 0]))
        .await
        .expect("save end");
    assert_eq!(totals.end_total, 43);
    assert_eq!(totals.session_total, 43);
    assert_eq!(totals.game_total, 43);

    let second = EndSlot { session: 2, end: 3 };
    let totals = repo
        .save_end(g.id, second, &end_arrows(2, 3, [5, 5, 5, 5, 5, 5]))
        .await
        .expect("save end");
    assert_eq!(totals.end_total, 30);
    assert_eq!(totals.session_total, 30);
    assert_eq!(totals.game_total, 73);

    assert_eq!(repo.find_game(g.id).await.expect("game").total_score, 73);
    let session = repo.session(g.id, 1).await.expect("session");
    assert_eq!(session.session_total, 43);
    assert_eq!(session.ends.len(), 6);
    assert_eq!(session.ends[0].total_score, 43);
    assert_eq!(session.ends[0].arrows.len(), 6);
    assert_eq!(session.ends[0].arrows[0].display_value, "10");
}

#[tokio::test]
async fn test_save_end_rejects_bad_input() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let g = repo.create_game(game(member.id, Some(1))).await.expect("game");
    let slot = EndSlot { session: 1, end: 1 };

    let err = repo
        .save_end(g.id, slot, &end_arrows(1, 1, [11, 0, 0, 0, 0, 0]))
        .await
        .expect_err("score too high");
    assert!(matches!(err, ArcheryError::Scoring(ScoringError::ScoreOutOfRange(11))));

    let err = repo
        .save_end(g.id, slot, &end_arrows(1, 2, [1, 1, 1, 1, 1, 1]))
        .await
        .expect_err("arrows of another end");
    assert!(matches!(err, ArcheryError::Scoring(ScoringError::InvalidPosition { .. })));

    let err = repo
        .save_end(g.id, EndSlot { session: 2, end: 1 }, &end_arrows(2, 1, [1; 6]))
        .await
        .expect_err("session outside game");
    assert!(matches!(err, ArcheryError::Scoring(ScoringError::InvalidPosition { .. })));

    assert_eq!(repo.find_game(g.id).await.expect("game").total_score, 0);
}

#[tokio::test]
async fn test_bulk_shots_and_labels() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let g = repo.create_game(game(member.id, None)).await.expect("game");

    let mut arrows = end_arrows(1, 2, [10, 10, 0, 0, 0, 0]);
    arrows[0].display_value = Some("X".to_string());
    arrows.extend(end_arrows(2, 6, [1, 2, 3, 4, 5, 6]));

    let total = repo.save_shots(g.id, &arrows).await.expect("save shots");
    assert_eq!(total, 41);

    let shots = repo.shots(g.id).await.expect("shots");
    let x = shots
        .iter()
        .find(|s| s.session_number == 1 && s.end_number == 2 && s.arrow_number == 1)
        .expect("arrow exists");
    assert_eq!(x.display_value, "X");
    assert_eq!(repo.session(g.id, 2).await.expect("session").session_total, 21);
}

#[tokio::test]
async fn test_delete_game_cascades() {
    let db = setup().await;
    let repo = ArcheryRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let g = repo.create_game(game(member.id, None)).await.expect("game");

    repo.delete_game(g.id).await.expect("delete");
    assert!(matches!(repo.shots(g.id).await, Err(ArcheryError::GameNotFound(_))));
    assert!(matches!(
        repo.delete_game(g.id).await,
        Err(ArcheryError::GameNotFound(_))
    ));
}
