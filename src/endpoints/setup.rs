use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use validator::Validate;

use crate::endpoints::auth::start_session;
use crate::error::{AppError, Result};
use crate::models::UserRole;
use crate::schemas::{LoginResponse, SetupRequest};
use crate::services::users::{create_user, super_admin_exists};
use crate::state::AppState;

pub fn setup_routes(state: AppState) -> Router {
    Router::new()
        .route("/setup", get(check_setup_required).post(initialize_setup))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct SetupRequiredResponse {
    setup_required: bool,
}

async fn check_setup_required(State(state): State<AppState>) -> Result<Json<SetupRequiredResponse>> {
    let setup_required = !super_admin_exists(&state.db).await?;
    Ok(Json(SetupRequiredResponse { setup_required }))
}

/// Create the first super admin and sign them in
async fn initialize_setup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetupRequest>,
) -> Result<Response> {
    request.validate()?;

    if super_admin_exists(&state.db).await? {
        return Err(AppError::Forbidden("Setup already completed".to_string()));
    }

    let admin = create_user(
        &state.db,
        &request.email,
        &request.full_name,
        Some(&request.password),
        UserRole::SuperAdmin,
    )
    .await?;
    tracing::info!(user_id = admin.id, "Initial super admin created");

    let cookie = start_session(&state, &admin, &headers).await?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user_id: admin.id,
            email: admin.email,
            role: admin.role,
            redirect_to: "/admin".to_string(),
        }),
    )
        .into_response())
}
