use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::middleware::{AnyUser, Authorized};
use crate::schemas::UserGroup;
use crate::services::user_groups;
use crate::state::AppState;

pub fn groups_routes(state: AppState) -> Router {
    Router::new()
        .route("/groups", get(my_groups))
        .route("/groups/{group_id}/leave", post(leave_group))
        .with_state(state)
}

async fn my_groups(
    auth: Authorized<AnyUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserGroup>>> {
    Ok(Json(
        user_groups::get_user_groups(&state.db, auth.user_id()).await?,
    ))
}

async fn leave_group(
    auth: Authorized<AnyUser>,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    user_groups::leave_group(&state.db, auth.user_id(), group_id).await?;
    Ok(Json(serde_json::json!({ "message": "You have left the group" })))
}
