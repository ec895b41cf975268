//! Super-admin management of organisations, their groups and admins

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::error::Result;
use crate::middleware::{Authorized, SuperAdminOnly};
use crate::schemas::{
    AssignAdmin, CreateGroup, CreateOrganisation, GroupResponse, OrganisationDetail,
    OrganisationResponse,
};
use crate::services::organisations;
use crate::state::AppState;

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/admin", get(list_organisations))
        .route(
            "/admin/organisations",
            get(list_organisations).post(create_organisation),
        )
        .route("/admin/organisations/{id}", get(get_organisation))
        .route("/admin/organisations/{id}/groups", post(create_group))
        .route("/admin/organisations/{id}/admins", post(assign_admin))
        .route(
            "/admin/organisations/{id}/admins/{user_id}",
            delete(remove_admin),
        )
        .with_state(state)
}

async fn list_organisations(
    _auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganisationResponse>>> {
    let orgs = organisations::list_organisations(&state.db).await?;
    Ok(Json(orgs.into_iter().map(Into::into).collect()))
}

async fn create_organisation(
    auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Json(request): Json<CreateOrganisation>,
) -> Result<(StatusCode, Json<OrganisationResponse>)> {
    let org = organisations::create_organisation(&state.db, &request).await?;
    tracing::info!(by = auth.user_id(), organisation_id = org.id, "Organisation created via admin");
    Ok((StatusCode::CREATED, Json(org.into())))
}

async fn get_organisation(
    _auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrganisationDetail>> {
    Ok(Json(organisations::organisation_detail(&state.db, id).await?))
}

async fn create_group(
    _auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateGroup>,
) -> Result<(StatusCode, Json<GroupResponse>)> {
    let group = organisations::create_group(&state.db, id, &request).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

async fn assign_admin(
    _auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AssignAdmin>,
) -> Result<Json<OrganisationDetail>> {
    organisations::assign_admin(&state.db, id, &request.email).await?;
    Ok(Json(organisations::organisation_detail(&state.db, id).await?))
}

async fn remove_admin(
    _auth: Authorized<SuperAdminOnly>,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    organisations::remove_admin(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
