//! Integration tests for members and tariff assignments.

mod common;

use orgkas_core::dues::{DuesStatus, Frequency};
use orgkas_db::repositories::{
    DuesInput, DuesRepository, LedgerGate, MemberError, MemberRepository, TariffError, TariffInput,
    TariffRepository,
};

use common::{date, member_input, setup};

fn tariff(name: &str, amount: i64) -> TariffInput {
    TariffInput {
        name: name.to_string(),
        amount,
        frequency: Frequency::Bulanan,
        notes: None,
        status: "aktif".to_string(),
    }
}

#[tokio::test]
async fn test_create_with_tariffs_and_detail() {
    let db = setup().await;
    let tariffs = TariffRepository::new(db.clone());
    let members = MemberRepository::new(db.clone());
    let monthly = tariffs.create(tariff("Bulanan", 50_000)).await.expect("tariff");
    let yearly = tariffs.create(tariff("Tahunan", 500_000)).await.expect("tariff");

    let mut input = member_input("Budi");
    input.tariff_ids = Some(vec![monthly.id, monthly.id]);
    let member = members.create(input).await.expect("member");

    DuesRepository::new(db.clone(), LedgerGate::new())
        .create(DuesInput {
            member_id: member.id,
            tariff_id: Some(monthly.id),
            month: 3,
            year: 2025,
            amount: 50_000,
            frequency: Frequency::Bulanan,
            paid_on: Some(date(2025, 3, 1)),
            status: DuesStatus::Lunas,
            notes: "Maret".to_string(),
        })
        .await
        .expect("dues");

    let detail = members.detail(member.id, 2025).await.expect("detail");
    assert_eq!(detail.member.name, "Budi");
    assert_eq!(detail.all_tariffs.len(), 2);
    assert_eq!(detail.assigned_tariffs.len(), 1);
    assert_eq!(detail.assigned_tariffs[0].id, monthly.id);
    assert_eq!(detail.dues.len(), 1);
    assert!(members.detail(member.id, 2024).await.expect("detail").dues.is_empty());
    assert_ne!(yearly.id, monthly.id);
}

#[tokio::test]
async fn test_assign_is_idempotent_and_remove() {
    let db = setup().await;
    let tariffs = TariffRepository::new(db.clone());
    let members = MemberRepository::new(db.clone());
    let t = tariffs.create(tariff("Bulanan", 50_000)).await.expect("tariff");
    let member = members.create(member_input("Budi")).await.expect("member");

    members.assign_tariff(member.id, t.id).await.expect("assign");
    members.assign_tariff(member.id, t.id).await.expect("assign again");
    assert_eq!(members.tariffs(member.id).await.expect("tariffs").len(), 1);

    members.remove_tariff(member.id, t.id).await.expect("remove");
    let err = members
        .remove_tariff(member.id, t.id)
        .await
        .expect_err("already removed");
    assert!(matches!(err, MemberError::NotAssigned { .. }));
}

#[tokio::test]
async fn test_replace_tariffs_is_all_or_nothing() {
    let db = setup().await;
    let tariffs = TariffRepository::new(db.clone());
    let members = MemberRepository::new(db.clone());
    let a = tariffs.create(tariff("A", 1)).await.expect("tariff");
    let b = tariffs.create(tariff("B", 2)).await.expect("tariff");
    let member = members.create(member_input("Budi")).await.expect("member");
    members.assign_tariff(member.id, a.id).await.expect("assign");

    let err = members
        .replace_tariffs(member.id, &[b.id, 999])
        .await
        .expect_err("unknown tariff");
    assert!(matches!(err, MemberError::TariffNotFound(999)));
    let kept: Vec<i32> = members
        .tariffs(member.id)
        .await
        .expect("tariffs")
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(kept, vec![a.id]);

    let replaced = members
        .replace_tariffs(member.id, &[b.id])
        .await
        .expect("replace");
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].id, b.id);
}

#[tokio::test]
async fn test_find_by_name_ignores_case_and_spaces() {
    let db = setup().await;
    let members = MemberRepository::new(db.clone());
    let member = members.create(member_input("Siti Aminah")).await.expect("member");

    let found = members
        .find_by_name("  siti aminah ")
        .await
        .expect("lookup")
        .expect("should match");
    assert_eq!(found.id, member.id);
    assert!(members.find_by_name("Siti").await.expect("lookup").is_none());
}

#[tokio::test]
async fn test_update_and_delete() {
    let db = setup().await;
    let members = MemberRepository::new(db.clone());
    let member = members.create(member_input("Budi")).await.expect("member");

    let mut input = member_input("Budi Santoso");
    input.status = "nonaktif".to_string();
    let updated = members.update(member.id, input).await.expect("update");
    assert_eq!(updated.name, "Budi Santoso");
    assert_eq!(members.list(Some("aktif")).await.expect("list").len(), 0);

    members.delete(member.id).await.expect("delete");
    assert!(matches!(
        members.find(member.id).await,
        Err(MemberError::NotFound(_))
    ));
    assert!(matches!(
        members.create(member_input("  ")).await,
        Err(MemberError::MissingName)
    ));
}

#[tokio::test]
async fn test_tariff_validation() {
    let db = setup().await;
    let tariffs = TariffRepository::new(db);

    assert!(matches!(
        tariffs.create(tariff("", 10)).await,
        Err(TariffError::MissingName)
    ));
    assert!(matches!(
        tariffs.create(tariff("Gratis", 0)).await,
        Err(TariffError::InvalidAmount)
    ));
    assert!(matches!(tariffs.delete(7).await, Err(TariffError::NotFound(7))));
}
