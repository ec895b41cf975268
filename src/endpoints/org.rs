//! Organisation-admin console
//!
//! Every group route resolves the organisation from the group row and checks
//! the caller administers it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sea_orm::EntityTrait;

use crate::error::{AppError, Result};
use crate::middleware::{Authorized, OrgStaff};
use crate::models::prelude::*;
use crate::schemas::{
    BulkInviteRequest, BulkInviteResult, ConsoleOrganisation, CreateInvite, CreateJoinLink,
    GroupConsole, InviteResponse, JoinLinkResponse,
};
use crate::services::{csv_import, invites, join_links, org_admin};
use crate::state::AppState;

pub fn org_routes(state: AppState) -> Router {
    Router::new()
        .route("/org", get(console))
        .route("/org/groups/{group_id}", get(group_console))
        .route("/org/groups/{group_id}/invites", post(create_invite))
        .route("/org/groups/{group_id}/invites/bulk", post(bulk_invite))
        .route("/org/groups/{group_id}/join-links", post(create_join_link))
        .route(
            "/org/groups/{group_id}/join-links/{link_id}/deactivate",
            post(deactivate_join_link),
        )
        .with_state(state)
}

async fn console(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConsoleOrganisation>>> {
    Ok(Json(org_admin::console(&state.db, auth.user()).await?))
}

async fn group_console(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupConsole>> {
    Ok(Json(
        org_admin::group_console(&state.db, auth.user(), group_id).await?,
    ))
}

async fn create_invite(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(request): Json<CreateInvite>,
) -> Result<(StatusCode, Json<InviteResponse>)> {
    let (_, group) = org_admin::load_managed_group(&state.db, auth.user(), group_id).await?;
    let email = invites::normalize_invite_email(request.email.as_deref())?;

    let invite = invites::create_invite(&state.db, group.id, email).await?;
    Ok((StatusCode::CREATED, Json(invite.into())))
}

async fn bulk_invite(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(request): Json<BulkInviteRequest>,
) -> Result<Json<BulkInviteResult>> {
    let (_, group) = org_admin::load_managed_group(&state.db, auth.user(), group_id).await?;

    let result =
        csv_import::bulk_create_invites(&state.db, Some(group.id), &request.csv_content).await;
    Ok(Json(result))
}

async fn create_join_link(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(request): Json<CreateJoinLink>,
) -> Result<(StatusCode, Json<JoinLinkResponse>)> {
    let (_, group) = org_admin::load_managed_group(&state.db, auth.user(), group_id).await?;

    let link = join_links::create_join_link(&state.db, &group, auth.user_id(), &request).await?;
    Ok((StatusCode::CREATED, Json(link.into())))
}

async fn deactivate_join_link(
    auth: Authorized<OrgStaff>,
    State(state): State<AppState>,
    Path((group_id, link_id)): Path<(i64, i64)>,
) -> Result<Json<JoinLinkResponse>> {
    let (_, group) = org_admin::load_managed_group(&state.db, auth.user(), group_id).await?;

    let link = JoinLink::find_by_id(link_id)
        .one(&state.db)
        .await?
        .filter(|link| link.group_id == group.id)
        .ok_or_else(|| AppError::NotFound("Join link not found".to_string()))?;

    let link = join_links::deactivate_join_link(&state.db, link).await?;
    Ok(Json(link.into()))
}
