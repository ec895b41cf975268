//! Test helpers for unit tests
//!
//! In-memory SQLite with the real migrations applied, plus seed functions
//! that insert rows directly.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::migrations::Migrator;
use crate::models::{group, organisation, user, Cadence, GroupType, UserRole};
use crate::services::organisations::slugify;

pub const TEST_PASSWORD: &str = "password123";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // A single connection, since every in-memory connection is its own database
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Insert an active user whose password is [`TEST_PASSWORD`]
pub async fn create_test_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        email: Set(email.to_lowercase()),
        full_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        hashed_password: Set(Some(bcrypt::hash(TEST_PASSWORD, 4).unwrap())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

pub async fn create_test_org(db: &DatabaseConnection, name: &str) -> organisation::Model {
    let now = Utc::now();
    organisation::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slugify(name)),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test organisation")
}

pub async fn create_test_group(
    db: &DatabaseConnection,
    organisation_id: i64,
    name: &str,
) -> group::Model {
    let now = Utc::now();
    group::ActiveModel {
        organisation_id: Set(organisation_id),
        name: Set(name.to_string()),
        description: Set(None),
        group_type: Set(GroupType::default()),
        audience_description: Set(None),
        cadence: Set(Cadence::default()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test group")
}
