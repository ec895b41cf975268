use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::InviteStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInvite {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: i64,
    pub group_id: i64,
    pub token: String,
    pub email: Option<String>,
    pub status: InviteStatus,
    pub invite_url: String,
    pub created_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Public view of an unused invite
#[derive(Debug, Clone, Serialize)]
pub struct InviteSummary {
    pub token: String,
    pub group_id: i64,
    pub group_name: String,
    pub organisation_name: String,
    pub email: Option<String>,
    pub can_sign_up: bool,
}

/// New account created from an invite or a join link
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl SignupRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub group_id: i64,
    pub user_id: i64,
    pub redirect_to: String,
}
