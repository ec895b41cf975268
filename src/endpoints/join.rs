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
use crate::middleware::{Authenticated, MaybeAuthenticated};
use crate::schemas::{JoinLinkSummary, MembershipResponse, SignupRequest};
use crate::services::join_links;
use crate::state::AppState;

const AFTER_JOIN_PATH: &str = "/groups";

pub fn join_routes(state: AppState) -> Router {
    Router::new()
        .route("/join/{token}", get(show_join_link).post(join))
        .route("/join/{token}/signup", post(signup))
        .with_state(state)
}

async fn show_join_link(
    MaybeAuthenticated(visitor): MaybeAuthenticated,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<JoinLinkSummary>> {
    Ok(Json(
        join_links::join_link_summary(&state.db, &token, visitor.as_ref()).await?,
    ))
}

async fn join(
    auth: Authenticated,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MembershipResponse>> {
    let link = join_links::redeem_join_link(&state.db, &token, auth.user_id()).await?;

    Ok(Json(MembershipResponse {
        group_id: link.group_id,
        user_id: auth.user_id(),
        redirect_to: AFTER_JOIN_PATH.to_string(),
    }))
}

/// Create an account through a join link and sign it in
async fn signup(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SignupRequest>,
) -> Result<Response> {
    request.validate()?;

    let (new_user, link) = join_links::signup_with_join_link(&state.db, &token, &request).await?;
    let cookie = start_session(&state, &new_user, &headers).await?;

    let body = MembershipResponse {
        group_id: link.group_id,
        user_id: new_user.id,
        redirect_to: AFTER_JOIN_PATH.to_string(),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}
