//! Integration tests for assessments.

mod common;

use orgkas_db::repositories::{
    AssessmentError, AssessmentInput, AssessmentRepository, AssessmentTypeInput, MemberRepository,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{create_member, member_input, setup};

fn kind(name: &str, weight: Option<Decimal>) -> AssessmentTypeInput {
    AssessmentTypeInput {
        name: name.to_string(),
        description: None,
        weight,
        status: "aktif".to_string(),
    }
}

fn score(member_id: i32, type_id: i32, score: Decimal) -> AssessmentInput {
    AssessmentInput {
        member_id,
        assessment_type_id: type_id,
        month: 6,
        year: 2025,
        score,
        notes: None,
    }
}

#[tokio::test]
async fn test_type_weight_defaults_to_one() {
    let repo = AssessmentRepository::new(setup().await);
    let created = repo.create_type(kind("Teknik", None)).await.expect("type");
    assert_eq!(created.weight, Decimal::ONE);

    let err = repo
        .create_type(kind("Fisik", Some(dec!(0))))
        .await
        .expect_err("zero weight");
    assert!(matches!(err, AssessmentError::Rule(_)));
}

#[tokio::test]
async fn test_create_is_upsert_per_period() {
    let db = setup().await;
    let repo = AssessmentRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let teknik = repo.create_type(kind("Teknik", None)).await.expect("type");

    let first = repo.upsert(score(member.id, teknik.id, dec!(70))).await.expect("save");
    let second = repo.upsert(score(member.id, teknik.id, dec!(85))).await.expect("save");

    assert_eq!(first.id, second.id);
    let rows = repo.list(Some(6), Some(2025), None).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].assessment.score, dec!(85));
    assert_eq!(rows[0].member_name.as_deref(), Some("Budi"));
    assert_eq!(rows[0].type_name.as_deref(), Some("Teknik"));
}

#[tokio::test]
async fn test_recap_averages_scores_per_member() {
    let db = setup().await;
    let repo = AssessmentRepository::new(db.clone());
    let budi = create_member(&db, "Budi").await;
    let siti = create_member(&db, "Siti").await;
    let teknik = repo.create_type(kind("Teknik", Some(dec!(3)))).await.expect("type");
    let fisik = repo.create_type(kind("Fisik", None)).await.expect("type");

    repo.upsert(score(budi.id, teknik.id, dec!(100))).await.expect("save");
    repo.upsert(score(budi.id, fisik.id, dec!(60))).await.expect("save");
    repo.upsert(score(siti.id, fisik.id, dec!(75))).await.expect("save");

    let recap = repo.recap(6, 2025, None).await.expect("recap");
    assert_eq!(recap.len(), 2);
    assert_eq!(recap[0].member_name, "Budi");
    assert_eq!(recap[0].summary.count, 2);
    assert_eq!(recap[0].summary.average, dec!(80));
    assert_eq!(recap[0].summary.weighted_average, dec!(90));
    assert_eq!(recap[1].summary.average, dec!(75));

    let mine = repo.recap(6, 2025, Some(siti.id)).await.expect("recap");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].member_id, siti.id);
}

#[tokio::test]
async fn test_recap_lists_active_members_without_scores() {
    let db = setup().await;
    let repo = AssessmentRepository::new(db.clone());
    let siti = create_member(&db, "Siti").await;
    let budi = create_member(&db, "Budi").await;
    let mut retired = member_input("Agus");
    retired.status = "nonaktif".to_string();
    MemberRepository::new(db.clone())
        .create(retired)
        .await
        .expect("member");
    let fisik = repo.create_type(kind("Fisik", None)).await.expect("type");

    repo.upsert(score(budi.id, fisik.id, dec!(70))).await.expect("save");

    let recap = repo.recap(6, 2025, None).await.expect("recap");
    let names: Vec<_> = recap.iter().map(|r| r.member_name.as_str()).collect();
    assert_eq!(names, ["Budi", "Siti"]);
    assert_eq!(recap[1].member_id, siti.id);
    assert_eq!(recap[1].summary.count, 0);
    assert_eq!(recap[1].summary.average, Decimal::ZERO);
    assert_eq!(recap[1].summary.weighted_average, Decimal::ZERO);

    // A different period has no scores for anyone.
    let empty = repo.recap(7, 2025, None).await.expect("recap");
    assert_eq!(empty.len(), 2);
    assert!(empty.iter().all(|r| r.summary.count == 0));
}

#[tokio::test]
async fn test_score_validation_and_missing_rows() {
    let db = setup().await;
    let repo = AssessmentRepository::new(db.clone());
    let member = create_member(&db, "Budi").await;
    let teknik = repo.create_type(kind("Teknik", None)).await.expect("type");

    assert!(matches!(
        repo.upsert(score(member.id, teknik.id, dec!(101))).await,
        Err(AssessmentError::Rule(_))
    ));
    assert!(matches!(
        repo.upsert(score(member.id, 999, dec!(50))).await,
        Err(AssessmentError::TypeNotFound(999))
    ));
    assert!(matches!(
        repo.update(999, dec!(50), None).await,
        Err(AssessmentError::NotFound(999))
    ));
}
