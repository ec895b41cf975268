use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupResponse, InviteResponse, JoinLinkResponse};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganisation {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignAdmin {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganisationResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::models::organisation::Model> for OrganisationResponse {
    fn from(org: crate::models::organisation::Model) -> Self {
        Self {
            id: org.id,
            name: org.name,
            slug: org.slug,
            description: org.description,
            is_active: org.is_active,
            created_at: org.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganisationAdminResponse {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganisationDetail {
    pub organisation: OrganisationResponse,
    pub groups: Vec<GroupResponse>,
    pub admins: Vec<OrganisationAdminResponse>,
}

/// Organisation with its groups, as shown in the organisation-admin console
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleOrganisation {
    pub organisation: OrganisationResponse,
    pub groups: Vec<GroupResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupConsole {
    pub organisation: OrganisationResponse,
    pub group: GroupResponse,
    pub invites: Vec<InviteResponse>,
    pub active_join_link: Option<JoinLinkResponse>,
}
