//! Multi-use group join links

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{group, join_link, join_link_redemption, user, UserRole};
use crate::schemas::{CreateJoinLink, JoinLinkResponse, JoinLinkState, JoinLinkSummary, SignupRequest};
use crate::services::security::{generate_token, JOIN_LINK_TOKEN_BYTES};
use crate::services::user_groups::{ensure_membership, is_active_member};
use crate::services::users::create_user;

/// Longest expiry an admin may set on a join link
pub const MAX_JOIN_LINK_DAYS: i64 = 3650;

pub fn join_url(token: &str) -> String {
    format!("{}/join/{}", CONFIG.server.public_url, token)
}

impl From<join_link::Model> for JoinLinkResponse {
    fn from(link: join_link::Model) -> Self {
        Self {
            id: link.id,
            group_id: link.group_id,
            organisation_id: link.organisation_id,
            join_url: join_url(&link.token),
            token: link.token,
            is_active: link.is_active,
            max_uses: link.max_uses,
            uses_count: link.uses_count,
            expires_at: link.expires_at,
            created_at: link.created_at,
        }
    }
}

/// A link is usable while active, unexpired and under its use cap
pub fn is_join_link_valid(link: &join_link::Model, now: DateTime<Utc>) -> bool {
    if !link.is_active {
        return false;
    }
    if link.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return false;
    }
    if link.max_uses.is_some_and(|max_uses| link.uses_count >= max_uses) {
        return false;
    }
    true
}

/// The group's newest active link
pub async fn get_active_join_link<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
) -> Result<Option<join_link::Model>> {
    Ok(JoinLink::find()
        .filter(join_link::Column::GroupId.eq(group_id))
        .filter(join_link::Column::IsActive.eq(true))
        .order_by_desc(join_link::Column::CreatedAt)
        .order_by_desc(join_link::Column::Id)
        .one(db)
        .await?)
}

pub async fn get_join_link_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<join_link::Model>> {
    Ok(JoinLink::find()
        .filter(join_link::Column::Token.eq(token))
        .one(db)
        .await?)
}

/// Replace the group's active link with a fresh one
pub async fn create_join_link(
    db: &DatabaseConnection,
    group: &group::Model,
    created_by: i64,
    options: &CreateJoinLink,
) -> Result<join_link::Model> {
    if options.max_uses.is_some_and(|max| max < 1) {
        return Err(AppError::BadRequest("Max uses must be at least 1".to_string()));
    }
    if options.expires_in_days.is_some_and(|days| days < 1) {
        return Err(AppError::BadRequest(
            "Expiry must be at least 1 day".to_string(),
        ));
    }
    if options.expires_in_days.is_some_and(|days| days > MAX_JOIN_LINK_DAYS) {
        return Err(AppError::BadRequest(format!(
            "Expiry must be at most {} days",
            MAX_JOIN_LINK_DAYS
        )));
    }

    let now = Utc::now();
    let expires_at = match options.expires_in_days {
        Some(days) => Some(
            Duration::try_days(days)
                .and_then(|delta| now.checked_add_signed(delta))
                .ok_or_else(|| AppError::BadRequest("Expiry is out of range".to_string()))?,
        ),
        None => None,
    };

    let txn = db.begin().await?;

    JoinLink::update_many()
        .col_expr(join_link::Column::IsActive, Expr::value(false))
        .filter(join_link::Column::GroupId.eq(group.id))
        .filter(join_link::Column::IsActive.eq(true))
        .exec(&txn)
        .await?;

    let link = join_link::ActiveModel {
        group_id: Set(group.id),
        organisation_id: Set(group.organisation_id),
        token: Set(generate_token(JOIN_LINK_TOKEN_BYTES)),
        is_active: Set(true),
        max_uses: Set(options.max_uses),
        uses_count: Set(0),
        expires_at: Set(expires_at),
        created_by: Set(Some(created_by)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(join_link_id = link.id, group_id = group.id, "Join link created");
    Ok(link)
}

/// Turn a link off; returns the updated link
pub async fn deactivate_join_link<C: ConnectionTrait>(
    db: &C,
    link: join_link::Model,
) -> Result<join_link::Model> {
    let mut active: join_link::ActiveModel = link.into();
    active.is_active = Set(false);
    let updated = active.update(db).await?;

    tracing::info!(join_link_id = updated.id, "Join link deactivated");
    Ok(updated)
}

/// Mark active links past their expiry as inactive
pub async fn expire_join_links<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let result = JoinLink::update_many()
        .col_expr(join_link::Column::IsActive, Expr::value(false))
        .filter(join_link::Column::IsActive.eq(true))
        .filter(join_link::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Look up a link that can still be redeemed
pub async fn find_valid_join_link<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<join_link::Model> {
    let link = get_join_link_by_token(db, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Join Link".to_string()))?;

    if !is_join_link_valid(&link, Utc::now()) {
        return Err(AppError::Gone("Link Expired or Unavailable".to_string()));
    }
    Ok(link)
}

/// Landing-page view of a join link for an optional visitor
pub async fn join_link_summary<C: ConnectionTrait>(
    db: &C,
    token: &str,
    visitor: Option<&user::Model>,
) -> Result<JoinLinkSummary> {
    let link = find_valid_join_link(db, token).await?;

    let group = Group::find_by_id(link.group_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Join Link".to_string()))?;
    let organisation_name = Organisation::find_by_id(group.organisation_id)
        .one(db)
        .await?
        .map(|org| org.name)
        .unwrap_or_else(|| "Unknown".to_string());

    let state = match visitor {
        None => JoinLinkState::SignupRequired,
        Some(visitor) => {
            if is_active_member(db, group.id, visitor.id).await? {
                JoinLinkState::AlreadyMember
            } else {
                JoinLinkState::CanJoin
            }
        }
    };

    Ok(JoinLinkSummary {
        token: link.token,
        group_id: group.id,
        group_name: group.name,
        organisation_name,
        state,
    })
}

/// Membership plus a single redemption record per (link, user)
async fn redeem<C: ConnectionTrait>(db: &C, link: &join_link::Model, user_id: i64) -> Result<()> {
    ensure_membership(db, link.group_id, user_id).await?;

    let already_redeemed = JoinLinkRedemption::find()
        .filter(join_link_redemption::Column::JoinLinkId.eq(link.id))
        .filter(join_link_redemption::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some();
    if already_redeemed {
        return Ok(());
    }

    join_link_redemption::ActiveModel {
        join_link_id: Set(link.id),
        user_id: Set(user_id),
        redeemed_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // Only counts while still under the cap
    let result = JoinLink::update_many()
        .col_expr(
            join_link::Column::UsesCount,
            Expr::col(join_link::Column::UsesCount).add(1),
        )
        .filter(join_link::Column::Id.eq(link.id))
        .filter(
            Condition::any()
                .add(join_link::Column::MaxUses.is_null())
                .add(Expr::col(join_link::Column::UsesCount).lt(Expr::col(join_link::Column::MaxUses))),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Gone("Link Expired or Unavailable".to_string()));
    }
    Ok(())
}

/// Join the link's group as an existing user
pub async fn redeem_join_link(
    db: &DatabaseConnection,
    token: &str,
    user_id: i64,
) -> Result<join_link::Model> {
    let txn = db.begin().await?;

    let link = find_valid_join_link(&txn, token).await?;
    redeem(&txn, &link, user_id).await?;

    txn.commit().await?;

    tracing::info!(join_link_id = link.id, user_id, "Join link redeemed");
    Ok(link)
}

/// Create an account and join the link's group
pub async fn signup_with_join_link(
    db: &DatabaseConnection,
    token: &str,
    request: &SignupRequest,
) -> Result<(user::Model, join_link::Model)> {
    let txn = db.begin().await?;

    let link = find_valid_join_link(&txn, token).await?;
    let new_user = create_user(
        &txn,
        &request.normalized_email(),
        &request.full_name(),
        Some(&request.password),
        UserRole::User,
    )
    .await?;
    redeem(&txn, &link, new_user.id).await?;

    txn.commit().await?;

    tracing::info!(join_link_id = link.id, user_id = new_user.id, "Signed up via join link");
    Ok((new_user, link))
}
