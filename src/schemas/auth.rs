use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserRole;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub email: String,
    pub role: UserRole,
    pub redirect_to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPageQuery {
    pub redirect: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPage {
    pub modes: Vec<&'static str>,
    pub redirect: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub redirect: Option<String>,
}

/// First super admin
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

impl From<&crate::models::user::Model> for CurrentUser {
    fn from(user: &crate::models::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}
