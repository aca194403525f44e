//! Shared setup for repository tests: a migrated in-memory SQLite database.

#![allow(dead_code)]

use chrono::NaiveDate;
use orgkas_db::entities::members;
use orgkas_db::migration::{Migrator, MigratorTrait};
use orgkas_db::repositories::{MemberInput, MemberRepository};
use sea_orm::DatabaseConnection;

/// Connects to a fresh in-memory database and runs every migration.
///
/// The pool holds a single connection so every query sees the same database.
pub async fn setup() -> DatabaseConnection {
    let db = orgkas_db::connect("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn member_input(name: &str) -> MemberInput {
    MemberInput {
        name: name.to_string(),
        nik: None,
        address: None,
        phone: None,
        email: None,
        joined_on: None,
        status: "aktif".to_string(),
        tariff_ids: None,
    }
}

pub async fn create_member(db: &DatabaseConnection, name: &str) -> members::Model {
    MemberRepository::new(db.clone())
        .create(member_input(name))
        .await
        .expect("Failed to create member")
}
