//! Integration tests for users and the organization profile.

mod common;

use orgkas_core::auth::UserRole;
use orgkas_db::repositories::{
    OrganizationInput, OrganizationRepository, UserError, UserInput, UserRepository,
};

use common::setup;

fn user(username: &str, role: UserRole) -> UserInput {
    UserInput {
        username: username.to_string(),
        name: "Test User".to_string(),
        role,
    }
}

#[tokio::test]
async fn test_user_create_and_find() {
    let repo = UserRepository::new(setup().await);

    let created = repo
        .create(user("budi", UserRole::Pengurus), "$argon2id$test_hash")
        .await
        .expect("Failed to create user");
    assert_eq!(created.role, "pengurus");

    let found = repo
        .find_by_username(" budi ")
        .await
        .expect("Failed to find user")
        .expect("User should exist");
    assert_eq!(found.id, created.id);
    assert_eq!(repo.find_by_id(created.id).await.expect("find").username, "budi");
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let repo = UserRepository::new(setup().await);
    repo.create(user("budi", UserRole::User), "hash").await.expect("create");

    let err = repo
        .create(user("budi", UserRole::Admin), "hash")
        .await
        .expect_err("duplicate");
    assert!(matches!(err, UserError::UsernameTaken(_)));

    let other = repo.create(user("siti", UserRole::User), "hash").await.expect("create");
    let err = repo
        .update(other.id, user("budi", UserRole::User))
        .await
        .expect_err("duplicate on update");
    assert!(matches!(err, UserError::UsernameTaken(_)));
}

#[tokio::test]
async fn test_password_change_and_delete() {
    let repo = UserRepository::new(setup().await);
    let created = repo.create(user("budi", UserRole::User), "old").await.expect("create");

    repo.set_password(created.id, "new").await.expect("set password");
    assert_eq!(repo.find_by_id(created.id).await.expect("find").password_hash, "new");

    repo.delete(created.id).await.expect("delete");
    assert!(matches!(repo.delete(created.id).await, Err(UserError::NotFound(_))));
    assert_eq!(repo.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_organization_save_is_upsert() {
    let repo = OrganizationRepository::new(setup().await);
    assert!(repo.current().await.expect("current").is_none());

    let first = repo
        .save(OrganizationInput {
            name: "Klub Panahan".to_string(),
            ..OrganizationInput::default()
        })
        .await
        .expect("save");
    let second = repo
        .save(OrganizationInput {
            name: "Klub Panahan Nusantara".to_string(),
            phone: Some("021-555".to_string()),
            ..OrganizationInput::default()
        })
        .await
        .expect("save");

    assert_eq!(first.id, second.id);
    let current = repo.current().await.expect("current").expect("profile");
    assert_eq!(current.name, "Klub Panahan Nusantara");
    assert_eq!(current.phone.as_deref(), Some("021-555"));
}
