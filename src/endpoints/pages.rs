use axum::{
    extract::State,
    response::Redirect,
    routing::get,
    Json, Router,
};

use crate::config::CONFIG;
use crate::error::Result;
use crate::middleware::{
    allowed_roles_for_route, is_organisation_admin_or_higher, is_super_admin, AnyUser, Authorized,
};
use crate::models::UserRole;
use crate::schemas::{AccessDenied, Dashboard, DebugMe, NavLink};
use crate::services::org_admin::admin_organisations;
use crate::state::AppState;

const NAV_LINKS: &[NavLink] = &[
    NavLink { label: "Dashboard", href: "/dashboard" },
    NavLink { label: "My Groups", href: "/groups" },
    NavLink { label: "Organisation Console", href: "/org" },
    NavLink { label: "Admin", href: "/admin" },
];

pub fn page_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(dashboard))
        .route("/debug/me", get(debug_me))
        .route("/access-denied", get(access_denied))
        .route("/api/health", get(health_check))
        .route("/api/version", get(get_version))
        .with_state(state)
}

/// Navigation entries the role may follow
pub fn nav_for_role(role: UserRole) -> Vec<NavLink> {
    NAV_LINKS
        .iter()
        .filter(|link| {
            allowed_roles_for_route(link.href).is_none_or(|roles| roles.contains(&role))
        })
        .cloned()
        .collect()
}

async fn dashboard(auth: Authorized<AnyUser>) -> Json<Dashboard> {
    Json(Dashboard {
        nav: nav_for_role(auth.user().role),
        user: auth.user().into(),
    })
}

async fn debug_me(
    auth: Authorized<AnyUser>,
    State(state): State<AppState>,
) -> Result<Json<DebugMe>> {
    let role = auth.user().role;
    let organisations = if is_organisation_admin_or_higher(role) {
        admin_organisations(&state.db, auth.user()).await?
    } else {
        Vec::new()
    };

    Ok(Json(DebugMe {
        user: auth.user().into(),
        is_super_admin: is_super_admin(role),
        is_organisation_admin_or_higher: is_organisation_admin_or_higher(role),
        organisations: organisations.into_iter().map(Into::into).collect(),
    }))
}

async fn access_denied() -> Json<AccessDenied> {
    Json(AccessDenied {
        title: "Access Denied",
        detail: "You do not have permission to view this page.",
        back_to: "/dashboard",
    })
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "backend": "rust"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(role: UserRole) -> Vec<&'static str> {
        nav_for_role(role).into_iter().map(|l| l.href).collect()
    }

    #[test]
    fn test_nav_follows_route_table() {
        assert_eq!(hrefs(UserRole::User), vec!["/dashboard", "/groups"]);
        assert_eq!(
            hrefs(UserRole::OrganisationAdmin),
            vec!["/dashboard", "/groups", "/org"]
        );
        assert_eq!(
            hrefs(UserRole::SuperAdmin),
            vec!["/dashboard", "/groups", "/org", "/admin"]
        );
    }
}
