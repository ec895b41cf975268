//! Session loading middleware
//!
//! Resolves the `curio_session` cookie to a user and stores it in request
//! extensions. Requests without a valid session pass through anonymously;
//! the authorisation gate decides what they may reach.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::models::user;
use crate::services::session::{extract_session_id, resolve_session};
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Id of the session the request was authenticated with
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

pub async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(session_id) = extract_session_id(req.headers()) {
        match resolve_session(&state.db, &session_id).await {
            Ok(Some(found)) => {
                req.extensions_mut().insert(AuthenticatedUser(found));
                req.extensions_mut().insert(SessionId(session_id));
            }
            Ok(None) => {
                tracing::debug!("Ignoring unknown or expired session cookie");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve session");
            }
        }
    }

    next.run(req).await
}
