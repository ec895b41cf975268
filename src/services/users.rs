use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    SqlErr,
};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{user, UserRole};
use crate::services::security::hash_password;

pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>> {
    Ok(User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?)
}

/// Create an account; emails are stored lower-case and must be unique
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    full_name: &str,
    password: Option<&str>,
    role: UserRole,
) -> Result<user::Model> {
    let email = email.trim().to_lowercase();

    if find_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let hashed_password = password.map(hash_password).transpose()?;
    let now = Utc::now();

    let new_user = user::ActiveModel {
        email: Set(email.clone()),
        full_name: Set(full_name.trim().to_string()),
        role: Set(role),
        hashed_password: Set(hashed_password),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
        ..Default::default()
    };

    let created = new_user.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email already registered".to_string())
        }
        _ => AppError::Database(err),
    })?;

    tracing::info!(user_id = created.id, role = %role, "User created");
    Ok(created)
}

/// Change a user's role
pub async fn set_user_role<C: ConnectionTrait>(
    db: &C,
    target: user::Model,
    role: UserRole,
) -> Result<user::Model> {
    let mut active: user::ActiveModel = target.into();
    active.role = Set(role);
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

pub async fn super_admin_exists<C: ConnectionTrait>(db: &C) -> Result<bool> {
    let count = User::find()
        .filter(user::Column::Role.eq(UserRole::SuperAdmin))
        .count(db)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let db = create_test_db().await;
        let user = create_user(&db, "  Ada@Example.COM ", "Ada Lovelace", Some("secret1"), UserRole::User)
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert!(user.hashed_password.is_some());
        assert!(find_user_by_email(&db, "ADA@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = create_test_db().await;
        create_user(&db, "ada@example.com", "Ada", None, UserRole::User)
            .await
            .unwrap();

        let result = create_user(&db, "ADA@example.com", "Ada", None, UserRole::User).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_super_admin_exists() {
        let db = create_test_db().await;
        assert!(!super_admin_exists(&db).await.unwrap());

        create_user(&db, "root@example.com", "Root", None, UserRole::SuperAdmin)
            .await
            .unwrap();
        assert!(super_admin_exists(&db).await.unwrap());
    }
}
