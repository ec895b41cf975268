use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::endpoints::auth::start_session;
use crate::error::Result;
use crate::middleware::Authenticated;
use crate::schemas::{InviteSummary, MembershipResponse, SignupRequest};
use crate::services::invites;
use crate::state::AppState;

const AFTER_JOIN_PATH: &str = "/groups";

pub fn invite_routes(state: AppState) -> Router {
    Router::new()
        .route("/invite/{token}", get(show_invite))
        .route("/invite/{token}/signup", post(signup))
        .route("/invite/{token}/accept", post(accept))
        .with_state(state)
}

async fn show_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InviteSummary>> {
    Ok(Json(invites::invite_summary(&state.db, &token).await?))
}

/// Create an account from an invite and sign it in
async fn signup(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SignupRequest>,
) -> Result<Response> {
    request.validate()?;

    let (new_user, invite) = invites::signup_with_invite(&state.db, &token, &request).await?;
    let cookie = start_session(&state, &new_user, &headers).await?;

    let body = MembershipResponse {
        group_id: invite.group_id,
        user_id: new_user.id,
        redirect_to: AFTER_JOIN_PATH.to_string(),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

async fn accept(
    auth: Authenticated,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MembershipResponse>> {
    let invite = invites::accept_invite(&state.db, &token, auth.user()).await?;

    Ok(Json(MembershipResponse {
        group_id: invite.group_id,
        user_id: auth.user_id(),
        redirect_to: AFTER_JOIN_PATH.to_string(),
    }))
}
