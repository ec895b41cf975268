pub mod admin;
pub mod auth;
pub mod groups;
pub mod invites;
pub mod join;
pub mod org;
pub mod pages;
pub mod setup;

use axum::{middleware as axum_middleware, Router};

use crate::middleware::{authorization_gate, load_session, security_headers};
use crate::state::AppState;

/// Create the main router
///
/// Layers run outside-in: security headers, session loading, then the
/// authorisation gate.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(pages::page_routes(state.clone()))
        .merge(auth::auth_routes(state.clone()))
        .merge(setup::setup_routes(state.clone()))
        .merge(admin::admin_routes(state.clone()))
        .merge(org::org_routes(state.clone()))
        .merge(invites::invite_routes(state.clone()))
        .merge(join::join_routes(state.clone()))
        .merge(groups::groups_routes(state.clone()))
        .layer(axum_middleware::from_fn(authorization_gate))
        .layer(axum_middleware::from_fn_with_state(state, load_session))
        .layer(axum_middleware::from_fn(security_headers))
}
