use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::mail::Mailer;

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Outgoing mail transport shared by all handlers
pub type SharedMailer = Arc<dyn Mailer>;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub mailer: SharedMailer,
}

impl AppState {
    pub fn new(db: DbConn, mailer: SharedMailer) -> Self {
        Self { db, mailer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mail::RecordingMailer;
    use crate::test_helpers::create_test_db;

    #[tokio::test]
    async fn test_app_state_clone_shares_mailer() {
        let db = create_test_db().await;
        let mailer: SharedMailer = Arc::new(RecordingMailer::default());

        let state1 = AppState::new(db, mailer);
        let state2 = state1.clone();

        assert!(Arc::ptr_eq(&state1.mailer, &state2.mailer));
    }
}
