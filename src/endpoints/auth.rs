use axum::{
    extract::{Query, State},
    http::{header, Extensions, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};

use sea_orm::EntityTrait;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::middleware::SessionId;
use crate::models::prelude::*;
use crate::models::user;
use crate::schemas::{
    CallbackQuery, LoginPage, LoginPageQuery, LoginRequest, LoginResponse, MagicLinkRequest,
};
use crate::services::mail::OutgoingMail;
use crate::services::security::{
    create_magic_link_code, sanitize_redirect, verify_magic_link_code, verify_password,
};
use crate::services::session::{clear_session_cookie, create_session, revoke_session, session_cookie};
use crate::services::users::find_user_by_email;
use crate::state::AppState;

const AUTH_FAILED_PATH: &str = "/login?error=auth_failed";

const MAGIC_LINK_SENT: &str = "If an account exists for that email, a login link has been sent";

/// Create auth routes for session management
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/login/magic-link", post(request_magic_link))
        .route("/auth/callback", get(auth_callback))
        .route("/logout", post(logout))
        .with_state(state)
}

// ============================================================================
// Session helpers
// ============================================================================

fn client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    (user_agent, ip_address)
}

/// Open a session for the user and return the cookie that carries it
pub(crate) async fn start_session(
    state: &AppState,
    user: &user::Model,
    headers: &HeaderMap,
) -> Result<HeaderValue> {
    let (user_agent, ip_address) = client_info(headers);
    let session = create_session(&state.db, user.id, user_agent, ip_address).await?;
    Ok(session_cookie(&session.id))
}

// ============================================================================
// Endpoints
// ============================================================================

async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        modes: vec!["password", "magic_link"],
        redirect: sanitize_redirect(query.redirect.as_deref()),
        error: query.error,
    })
}

/// Login with email and password, returns session cookie
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let found_user = find_user_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !found_user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    let password_ok = found_user
        .hashed_password
        .as_deref()
        .is_some_and(|hash| verify_password(&request.password, hash));
    if !password_ok {
        tracing::info!(user_id = found_user.id, "Failed password login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let cookie = start_session(&state, &found_user, &headers).await?;
    tracing::info!(user_id = found_user.id, "User logged in");

    let response = Json(LoginResponse {
        user_id: found_user.id,
        email: found_user.email,
        role: found_user.role,
        redirect_to: sanitize_redirect(request.redirect.as_deref()),
    });

    Ok(([(header::SET_COOKIE, cookie)], response).into_response())
}

/// Mail a one-time login link
///
/// The response does not reveal whether the address belongs to an account.
async fn request_magic_link(
    State(state): State<AppState>,
    Json(request): Json<MagicLinkRequest>,
) -> Result<Json<serde_json::Value>> {
    let found_user = find_user_by_email(&state.db, &request.email)
        .await?
        .filter(|u| u.is_active);

    if let Some(found_user) = found_user {
        let code = create_magic_link_code(found_user.id, &found_user.email)?;
        let redirect = sanitize_redirect(request.redirect.as_deref());
        let link = format!(
            "{}/auth/callback?code={}&redirect={}",
            CONFIG.server.public_url,
            urlencoding::encode(&code),
            urlencoding::encode(&redirect)
        );

        let mail = OutgoingMail {
            to: found_user.email.clone(),
            subject: "Your Curio login link".to_string(),
            body: format!(
                "Hi {},\n\nUse this link to sign in to Curio:\n\n{}\n\nThe link expires in {} minutes.\n",
                found_user.full_name, link, CONFIG.auth.magic_link_ttl_minutes
            ),
        };

        if let Err(e) = state.mailer.send(mail).await {
            tracing::error!(user_id = found_user.id, error = %e, "Failed to send magic link");
        }
    } else {
        tracing::debug!("Magic link requested for unknown email");
    }

    Ok(Json(serde_json::json!({ "message": MAGIC_LINK_SENT })))
}

/// Exchange a magic-link code for a session
async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let Some(code) = query.code.as_deref() else {
        return Ok(Redirect::to(AUTH_FAILED_PATH).into_response());
    };

    let user_id = match verify_magic_link_code(code) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::info!(error = %e, "Rejected magic link");
            return Ok(Redirect::to(AUTH_FAILED_PATH).into_response());
        }
    };

    let found_user = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .filter(|u| u.is_active);
    let Some(found_user) = found_user else {
        return Ok(Redirect::to(AUTH_FAILED_PATH).into_response());
    };

    let cookie = start_session(&state, &found_user, &headers).await?;
    tracing::info!(user_id = found_user.id, "User logged in with magic link");

    let target = sanitize_redirect(query.redirect.as_deref());
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response())
}

/// Logout - revokes the session and clears the cookie
async fn logout(State(state): State<AppState>, extensions: Extensions) -> Result<Response> {
    if let Some(SessionId(session_id)) = extensions.get::<SessionId>() {
        revoke_session(&state.db, session_id).await?;
        tracing::info!("Session revoked");
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
        .into_response())
}
