use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJoinLink {
    pub max_uses: Option<i32>,
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinLinkResponse {
    pub id: i64,
    pub group_id: i64,
    pub organisation_id: i64,
    pub token: String,
    pub join_url: String,
    pub is_active: bool,
    pub max_uses: Option<i32>,
    pub uses_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What the visitor of a join link can do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinLinkState {
    AlreadyMember,
    CanJoin,
    SignupRequired,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinLinkSummary {
    pub token: String,
    pub group_id: i64,
    pub group_name: String,
    pub organisation_name: String,
    pub state: JoinLinkState,
}
