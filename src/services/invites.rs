//! Single-use group invites

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{invite, user, InviteStatus, UserRole};
use crate::schemas::{InviteResponse, InviteSummary, SignupRequest};
use crate::services::csv_import::is_valid_email;
use crate::services::security::{generate_token, INVITE_TOKEN_BYTES};
use crate::services::user_groups::ensure_membership;
use crate::services::users::create_user;

pub fn invite_url(token: &str) -> String {
    format!("{}/invite/{}", CONFIG.server.public_url, token)
}

impl From<invite::Model> for InviteResponse {
    fn from(invite: invite::Model) -> Self {
        Self {
            id: invite.id,
            group_id: invite.group_id,
            invite_url: invite_url(&invite.token),
            token: invite.token,
            email: invite.email,
            status: invite.status,
            created_at: invite.created_at,
            joined_at: invite.joined_at,
        }
    }
}

/// Normalize an optional target email; blank means an open invite
pub fn normalize_invite_email(email: Option<&str>) -> Result<Option<String>> {
    match email.map(|e| e.trim().to_lowercase()) {
        None => Ok(None),
        Some(e) if e.is_empty() => Ok(None),
        Some(e) if is_valid_email(&e) => Ok(Some(e)),
        Some(e) => Err(AppError::BadRequest(format!("Invalid email \"{}\"", e))),
    }
}

/// Issue a new invite into a group
pub async fn create_invite<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    email: Option<String>,
) -> Result<invite::Model> {
    let invite = invite::ActiveModel {
        group_id: Set(group_id),
        token: Set(generate_token(INVITE_TOKEN_BYTES)),
        email: Set(email),
        status: Set(InviteStatus::Invited),
        created_at: Set(Utc::now()),
        joined_at: Set(None),
        ..Default::default()
    };
    let created = invite.insert(db).await?;

    tracing::info!(invite_id = created.id, group_id, "Invite created");
    Ok(created)
}

/// Invites of a group, newest first
pub async fn list_invites<C: ConnectionTrait>(db: &C, group_id: i64) -> Result<Vec<invite::Model>> {
    Ok(Invite::find()
        .filter(invite::Column::GroupId.eq(group_id))
        .order_by_desc(invite::Column::CreatedAt)
        .order_by_desc(invite::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_invite_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<invite::Model>> {
    Ok(Invite::find()
        .filter(invite::Column::Token.eq(token))
        .one(db)
        .await?)
}

/// Flip an invite to `joined`
///
/// Only an `invited` row is updated, so two concurrent redemptions cannot
/// both succeed.
pub async fn mark_invite_joined<C: ConnectionTrait>(db: &C, invite_id: i64) -> Result<()> {
    let result = Invite::update_many()
        .col_expr(invite::Column::Status, Expr::value(InviteStatus::Joined))
        .col_expr(invite::Column::JoinedAt, Expr::value(Utc::now()))
        .filter(invite::Column::Id.eq(invite_id))
        .filter(invite::Column::Status.eq(InviteStatus::Invited))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Gone("Invite Already Used".to_string()));
    }
    Ok(())
}

/// Look up an invite that can still be redeemed
pub async fn find_usable_invite<C: ConnectionTrait>(db: &C, token: &str) -> Result<invite::Model> {
    let invite = get_invite_by_token(db, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Invite Link".to_string()))?;

    if invite.status == InviteStatus::Joined {
        return Err(AppError::Gone("Invite Already Used".to_string()));
    }
    Ok(invite)
}

/// Public view of an invite for its landing page
pub async fn invite_summary<C: ConnectionTrait>(db: &C, token: &str) -> Result<InviteSummary> {
    let invite = find_usable_invite(db, token).await?;

    let group = Group::find_by_id(invite.group_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Invite Link".to_string()))?;
    let organisation_name = Organisation::find_by_id(group.organisation_id)
        .one(db)
        .await?
        .map(|org| org.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(InviteSummary {
        token: invite.token,
        group_id: group.id,
        group_name: group.name,
        organisation_name,
        email: invite.email,
        can_sign_up: true,
    })
}

fn check_invite_email(invite: &invite::Model, email: &str) -> Result<()> {
    match &invite.email {
        Some(target) if !target.eq_ignore_ascii_case(email) => Err(AppError::Forbidden(
            "This invite was issued for a different email address".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Create an account from an invite and add it to the invite's group
pub async fn signup_with_invite(
    db: &DatabaseConnection,
    token: &str,
    request: &SignupRequest,
) -> Result<(user::Model, invite::Model)> {
    let email = request.normalized_email();
    let txn = db.begin().await?;

    let invite = find_usable_invite(&txn, token).await?;
    check_invite_email(&invite, &email)?;

    let new_user = create_user(
        &txn,
        &email,
        &request.full_name(),
        Some(&request.password),
        UserRole::User,
    )
    .await?;
    ensure_membership(&txn, invite.group_id, new_user.id).await?;
    mark_invite_joined(&txn, invite.id).await?;

    txn.commit().await?;

    tracing::info!(user_id = new_user.id, group_id = invite.group_id, "Signed up via invite");
    Ok((new_user, invite))
}

/// Redeem an invite for an existing account
pub async fn accept_invite(
    db: &DatabaseConnection,
    token: &str,
    member: &user::Model,
) -> Result<invite::Model> {
    let txn = db.begin().await?;

    let invite = find_usable_invite(&txn, token).await?;
    check_invite_email(&invite, &member.email)?;

    ensure_membership(&txn, invite.group_id, member.id).await?;
    mark_invite_joined(&txn, invite.id).await?;

    txn.commit().await?;

    tracing::info!(user_id = member.id, group_id = invite.group_id, "Invite accepted");
    Ok(invite)
}
