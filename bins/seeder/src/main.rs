//! Database seeder for orgkas.
//!
//! Seeds the default organization profile and an administrator account so a
//! fresh install can be logged into. Existing data is left alone.
//!
//! Usage: cargo run --bin seeder
//!
//! `SEED_ADMIN_PASSWORD` overrides the default admin password.

use anyhow::Context;
use orgkas_core::auth::{UserRole, hash_password};
use orgkas_db::repositories::{OrganizationInput, UserInput};
use orgkas_db::{OrganizationRepository, UserRepository};
use sea_orm::DatabaseConnection;

const ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = orgkas_db::connect(&database_url, 1, 1)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding organization...");
    seed_organization(&db).await?;

    println!("Seeding admin user...");
    seed_admin(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Saves a placeholder profile unless one exists.
async fn seed_organization(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = OrganizationRepository::new(db.clone());
    if repo.current().await?.is_some() {
        println!("  Organization already exists, skipping...");
        return Ok(());
    }

    repo.save(OrganizationInput {
        name: "Organisasi Saya".to_string(),
        description: Some("Ubah profil ini dari menu organisasi".to_string()),
        ..OrganizationInput::default()
    })
    .await?;
    println!("  Created default organization");
    Ok(())
}

/// Creates the `admin` account unless it exists.
async fn seed_admin(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = UserRepository::new(db.clone());
    if repo.find_by_username(ADMIN_USERNAME).await?.is_some() {
        println!("  Admin user already exists, skipping...");
        return Ok(());
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    let hash = hash_password(&password)?;
    repo.create(
        UserInput {
            username: ADMIN_USERNAME.to_string(),
            name: "Administrator".to_string(),
            role: UserRole::Admin,
        },
        &hash,
    )
    .await?;
    println!("  Created user '{ADMIN_USERNAME}'");
    Ok(())
}
