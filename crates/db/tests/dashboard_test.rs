//! Integration tests for dashboard figures.

mod common;

use orgkas_core::dues::{DuesStatus, Frequency};
use orgkas_db::repositories::{
    DashboardRepository, DuesInput, DuesRepository, LedgerGate, MemberRepository,
};

use common::{date, member_input, setup};

#[tokio::test]
async fn test_stats_and_chart() {
    let db = setup().await;
    let members = MemberRepository::new(db.clone());
    let dues = DuesRepository::new(db.clone(), LedgerGate::new());

    let mut input = member_input("Budi");
    input.joined_on = Some(date(2025, 5, 20));
    let budi = members.create(input).await.expect("member");
    members.create(member_input("Siti")).await.expect("member");

    for (month, status) in [(5, DuesStatus::Lunas), (6, DuesStatus::Lunas), (6, DuesStatus::BelumLunas)] {
        dues.create(DuesInput {
            member_id: budi.id,
            tariff_id: None,
            month,
            year: 2025,
            amount: 50_000,
            frequency: Frequency::Bulanan,
            paid_on: Some(date(2025, u32::try_from(month).expect("month"), 10)),
            status,
            notes: String::new(),
        })
        .await
        .expect("dues");
    }

    let repo = DashboardRepository::new(db);
    let stats = repo.stats().await.expect("stats");
    assert_eq!(stats.total_members, 2);
    assert_eq!(stats.paid_dues, 2);
    assert_eq!(stats.total_debit, 100_000);
    assert_eq!(stats.total_credit, 0);
    assert_eq!(stats.balance, 100_000);

    let chart = repo.chart(date(2025, 6, 30)).await.expect("chart");
    assert_eq!(chart.labels.len(), 12);
    assert_eq!(chart.labels.last().map(String::as_str), Some("2025-06"));
    assert_eq!(chart.new_members[10..], [1, 0]);
    assert_eq!(chart.dues_paid[10..], [1, 1]);
    assert_eq!(chart.balance[9..], [0, 50_000, 100_000]);
}
