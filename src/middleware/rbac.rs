//! Role-based authorisation
//!
//! A static table maps protected path prefixes to the roles allowed behind
//! them. The [`authorization_gate`] middleware applies it to every request;
//! handlers additionally declare their role set through the typed
//! [`Authorized`] extractor.
//!
//! ```ignore
//! async fn list_organisations(
//!     Authorized(user, ..): Authorized<SuperAdminOnly>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<Vec<OrganisationResponse>>> {
//!     // role already checked
//! }
//! ```

use std::convert::Infallible;
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{user, UserRole};

const ALL_ROLES: &[UserRole] = &[
    UserRole::SuperAdmin,
    UserRole::OrganisationAdmin,
    UserRole::User,
];

const STAFF_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::OrganisationAdmin];

/// Protected prefixes and the roles allowed behind each
pub const ROUTE_ROLES: &[(&str, &[UserRole])] = &[
    ("/admin", &[UserRole::SuperAdmin]),
    ("/org", STAFF_ROLES),
    ("/dashboard", ALL_ROLES),
    ("/debug/me", ALL_ROLES),
    ("/groups", ALL_ROLES),
];

const AUTH_ROUTES: &[&str] = &["/login"];

pub const LOGIN_PATH: &str = "/login";
pub const ACCESS_DENIED_PATH: &str = "/access-denied";
pub const DASHBOARD_PATH: &str = "/dashboard";

pub fn is_super_admin(role: UserRole) -> bool {
    role == UserRole::SuperAdmin
}

pub fn is_organisation_admin_or_higher(role: UserRole) -> bool {
    matches!(role, UserRole::SuperAdmin | UserRole::OrganisationAdmin)
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Roles allowed for a path, or `None` when the path is public
pub fn allowed_roles_for_route(path: &str) -> Option<&'static [UserRole]> {
    ROUTE_ROLES
        .iter()
        .find(|(prefix, _)| matches_prefix(path, prefix))
        .map(|(_, roles)| *roles)
}

pub fn is_auth_route(path: &str) -> bool {
    AUTH_ROUTES.iter().any(|prefix| matches_prefix(path, prefix))
}

/// Outcome of the authorisation gate for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin { redirect: String },
    AccessDenied,
    AlreadySignedIn,
}

impl GateDecision {
    pub fn location(&self) -> Option<String> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin { redirect } => Some(format!(
                "{}?redirect={}",
                LOGIN_PATH,
                urlencoding::encode(redirect)
            )),
            GateDecision::AccessDenied => Some(ACCESS_DENIED_PATH.to_string()),
            GateDecision::AlreadySignedIn => Some(DASHBOARD_PATH.to_string()),
        }
    }
}

/// Decide what happens to a request for `path` by a caller with `role`
pub fn decide(path: &str, role: Option<UserRole>) -> GateDecision {
    if is_auth_route(path) {
        return match role {
            Some(_) => GateDecision::AlreadySignedIn,
            None => GateDecision::Allow,
        };
    }

    let Some(allowed) = allowed_roles_for_route(path) else {
        return GateDecision::Allow;
    };

    match role {
        None => GateDecision::RedirectToLogin {
            redirect: path.to_string(),
        },
        Some(role) if allowed.contains(&role) => GateDecision::Allow,
        Some(_) => GateDecision::AccessDenied,
    }
}

/// Check a possibly anonymous user against a role set
pub fn require_role<'a>(
    current: Option<&'a user::Model>,
    allowed: &[UserRole],
) -> Result<&'a user::Model, AppError> {
    let current =
        current.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !allowed.contains(&current.role) {
        return Err(AppError::Forbidden(format!(
            "Role {} is not allowed here",
            current.role
        )));
    }
    Ok(current)
}

/// Middleware enforcing [`ROUTE_ROLES`] with redirects
///
/// Must run after the session loader.
pub async fn authorization_gate(req: Request, next: Next) -> Response {
    let role = req
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|current| current.0.role);

    let decision = decide(req.uri().path(), role);
    match decision.location() {
        None => next.run(req).await,
        Some(location) => {
            tracing::debug!(path = %req.uri().path(), ?decision, "Request redirected by gate");
            Redirect::to(&location).into_response()
        }
    }
}

/// Trait for role-set marker types
pub trait RoleSet: Send + Sync + 'static {
    const NAME: &'static str;
    const ROLES: &'static [UserRole];
}

/// Creates zero-sized marker types that implement `RoleSet`
macro_rules! define_role_sets {
    ($($(#[$meta:meta])* $name:ident => $roles:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RoleSet for $name {
                const NAME: &'static str = stringify!($name);
                const ROLES: &'static [UserRole] = $roles;
            }
        )*
    };
}

define_role_sets! {
    /// Platform-wide management
    SuperAdminOnly => &[UserRole::SuperAdmin],
    /// Organisation consoles
    OrgStaff => STAFF_ROLES,
    /// Any signed-in account
    AnyUser => ALL_ROLES,
}

/// Extractor that requires the caller's role to be in `R`
#[derive(Debug, Clone)]
pub struct Authorized<R: RoleSet>(pub user::Model, pub PhantomData<R>);

impl<R: RoleSet> Authorized<R> {
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts.extensions.get::<AuthenticatedUser>().map(|u| &u.0);
        let current = require_role(current, R::ROLES).map_err(|e| {
            if let AppError::Forbidden(_) = e {
                tracing::warn!(role_set = R::NAME, "Role check failed");
            }
            e
        })?;

        Ok(Authorized(current.clone(), PhantomData))
    }
}

/// Extractor for any signed-in user
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl Authenticated {
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Authenticated(current.0.clone()))
    }
}

/// Extractor for pages that serve both visitors and signed-in users
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthenticated(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|current| current.0.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(role: UserRole) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: 7,
            email: "ada@example.com".to_string(),
            full_name: "Ada".to_string(),
            role,
            hashed_password: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_prefix_matching_respects_segments() {
        assert!(allowed_roles_for_route("/admin").is_some());
        assert!(allowed_roles_for_route("/admin/organisations/1").is_some());
        assert!(allowed_roles_for_route("/administrator").is_none());
        assert!(allowed_roles_for_route("/organisations").is_none());
        assert!(allowed_roles_for_route("/org/groups/3").is_some());
        assert!(allowed_roles_for_route("/invite/abc").is_none());
        assert!(allowed_roles_for_route("/").is_none());
    }

    #[test]
    fn test_route_table() {
        assert_eq!(allowed_roles_for_route("/admin"), Some(&[UserRole::SuperAdmin][..]));
        assert_eq!(allowed_roles_for_route("/org"), Some(STAFF_ROLES));
        assert_eq!(allowed_roles_for_route("/dashboard"), Some(ALL_ROLES));
        assert_eq!(allowed_roles_for_route("/debug/me"), Some(ALL_ROLES));
    }

    #[test]
    fn test_anonymous_is_sent_to_login_with_destination() {
        let decision = decide("/org/groups/3", None);
        assert_eq!(
            decision.location().as_deref(),
            Some("/login?redirect=%2Forg%2Fgroups%2F3")
        );
    }

    #[test]
    fn test_wrong_role_is_denied() {
        assert_eq!(decide("/admin", Some(UserRole::OrganisationAdmin)), GateDecision::AccessDenied);
        assert_eq!(decide("/org", Some(UserRole::User)), GateDecision::AccessDenied);
        assert_eq!(decide("/org", Some(UserRole::OrganisationAdmin)), GateDecision::Allow);
        assert_eq!(decide("/dashboard", Some(UserRole::User)), GateDecision::Allow);
    }

    #[test]
    fn test_auth_routes() {
        assert!(is_auth_route("/login"));
        assert!(is_auth_route("/login/magic-link"));
        assert!(!is_auth_route("/logout"));
        assert_eq!(decide("/login", Some(UserRole::User)), GateDecision::AlreadySignedIn);
        assert_eq!(decide("/login", None), GateDecision::Allow);
    }

    #[test]
    fn test_public_paths_pass() {
        assert_eq!(decide("/join/abc", None), GateDecision::Allow);
        assert_eq!(decide("/api/health", None), GateDecision::Allow);
    }

    #[test]
    fn test_role_helpers() {
        assert!(is_super_admin(UserRole::SuperAdmin));
        assert!(!is_super_admin(UserRole::OrganisationAdmin));
        assert!(is_organisation_admin_or_higher(UserRole::SuperAdmin));
        assert!(is_organisation_admin_or_higher(UserRole::OrganisationAdmin));
        assert!(!is_organisation_admin_or_higher(UserRole::User));
    }

    #[test]
    fn test_require_role() {
        let admin = user_with(UserRole::OrganisationAdmin);

        assert!(require_role(Some(&admin), OrgStaff::ROLES).is_ok());
        assert!(matches!(
            require_role(Some(&admin), SuperAdminOnly::ROLES),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            require_role(None, AnyUser::ROLES),
            Err(AppError::Unauthorized(_))
        ));
    }
}
