//! Server-side login sessions
//!
//! A session is a row in `sessions` keyed by a random UUID. The id travels
//! in the `curio_session` cookie; everything else stays in the database.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::config::CONFIG;
use crate::error::Result;
use crate::models::prelude::*;
use crate::models::{session, user};

pub const SESSION_COOKIE_NAME: &str = "curio_session";

/// Open a new session for a user and stamp their last login
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    user_agent: Option<String>,
    ip_address: Option<String>,
) -> Result<session::Model> {
    let now = Utc::now();

    let new_session = session::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        user_agent: Set(user_agent),
        ip_address: Set(ip_address),
        created_at: Set(now),
        expires_at: Set(now + Duration::hours(CONFIG.auth.session_ttl_hours)),
        last_accessed_at: Set(now),
        is_revoked: Set(false),
    };
    let created = new_session.insert(db).await?;

    user::ActiveModel {
        id: Set(user_id),
        last_login_at: Set(Some(now)),
        ..Default::default()
    }
    .update(db)
    .await?;

    tracing::debug!(user_id, "Session created");
    Ok(created)
}

/// Resolve a session id to its active user
///
/// Returns `None` for unknown, revoked or expired sessions and for
/// inactive users.
pub async fn resolve_session<C: ConnectionTrait>(
    db: &C,
    session_id: &str,
) -> Result<Option<user::Model>> {
    let now = Utc::now();

    let found = Session::find_by_id(session_id.to_string())
        .filter(session::Column::IsRevoked.eq(false))
        .filter(session::Column::ExpiresAt.gt(now))
        .one(db)
        .await?;

    let Some(found) = found else {
        return Ok(None);
    };

    let owner = User::find_by_id(found.user_id)
        .filter(user::Column::IsActive.eq(true))
        .one(db)
        .await?;

    if owner.is_some() {
        let mut active: session::ActiveModel = found.into();
        active.last_accessed_at = Set(now);
        active.update(db).await?;
    }

    Ok(owner)
}

/// Mark a session as revoked
pub async fn revoke_session<C: ConnectionTrait>(db: &C, session_id: &str) -> Result<()> {
    Session::update_many()
        .col_expr(session::Column::IsRevoked, Expr::value(true))
        .filter(session::Column::Id.eq(session_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Delete expired sessions and sessions revoked more than a day ago
pub async fn purge_stale_sessions<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let now = Utc::now();
    let result = Session::delete_many()
        .filter(
            Condition::any()
                .add(session::Column::ExpiresAt.lte(now))
                .add(
                    Condition::all()
                        .add(session::Column::IsRevoked.eq(true))
                        .add(session::Column::LastAccessedAt.lte(now - Duration::days(1))),
                ),
        )
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Build the `Set-Cookie` value carrying a session id
pub fn session_cookie(session_id: &str) -> HeaderValue {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE_NAME,
        session_id,
        CONFIG.auth.session_ttl_hours * 3600,
        if CONFIG.server.secure_cookies() { "; Secure" } else { "" }
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Build the `Set-Cookie` value that clears the session
pub fn clear_session_cookie() -> HeaderValue {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE_NAME
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Extract the session id from the cookie header
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
