use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Cadence, GroupType};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub group_type: GroupType,
    pub audience_description: Option<String>,
    #[serde(default)]
    pub cadence: Cadence,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: i64,
    pub organisation_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
    pub group_type_label: &'static str,
    pub audience_description: Option<String>,
    pub cadence: Cadence,
    pub cadence_label: &'static str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::models::group::Model> for GroupResponse {
    fn from(group: crate::models::group::Model) -> Self {
        Self {
            id: group.id,
            organisation_id: group.organisation_id,
            name: group.name,
            description: group.description,
            group_type_label: group.group_type.label(),
            group_type: group.group_type,
            audience_description: group.audience_description,
            cadence_label: group.cadence.label(),
            cadence: group.cadence,
            is_active: group.is_active,
            created_at: group.created_at,
        }
    }
}

/// A group the current user belongs to
#[derive(Debug, Clone, Serialize)]
pub struct UserGroup {
    pub group_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
    pub cadence: Cadence,
    pub organisation_id: i64,
    pub organisation_name: String,
    pub joined_at: DateTime<Utc>,
}
