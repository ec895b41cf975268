use serde::Serialize;

use super::{CurrentUser, OrganisationResponse};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: CurrentUser,
    pub nav: Vec<NavLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugMe {
    pub user: CurrentUser,
    pub is_super_admin: bool,
    pub is_organisation_admin_or_higher: bool,
    pub organisations: Vec<OrganisationResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessDenied {
    pub title: &'static str,
    pub detail: &'static str,
    pub back_to: &'static str,
}
