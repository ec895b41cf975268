//! Periodic task scheduler
//!
//! Runs background housekeeping at fixed intervals. Each task is a
//! `PeriodicTask` spawned on its own tokio task.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use super::join_links::expire_join_links;
use super::session::purge_stale_sessions;

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// How often to run
    fn interval(&self) -> Duration;

    /// Execute the task
    async fn run(&self, db: &DatabaseConnection) -> anyhow::Result<()>;
}

pub fn default_tasks() -> Vec<Box<dyn PeriodicTask>> {
    vec![Box::new(SessionCleanupTask), Box::new(JoinLinkExpiryTask)]
}

/// Start all periodic tasks
pub fn start_scheduler(db: Arc<DatabaseConnection>) {
    for task in default_tasks() {
        let db = db.clone();
        tokio::spawn(async move {
            run_task(task, db).await;
        });
    }

    tracing::info!("Periodic task scheduler started");
}

/// Run a single task on its interval
async fn run_task(task: Box<dyn PeriodicTask>, db: Arc<DatabaseConnection>) {
    let mut ticker = interval(task.interval());

    // Skip the first immediate tick
    ticker.tick().await;

    loop {
        ticker.tick().await;

        tracing::debug!(task = task.name(), "Running periodic task");

        match task.run(&db).await {
            Ok(()) => {
                tracing::debug!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

/// Deletes expired sessions and sessions revoked over a day ago
pub struct SessionCleanupTask;

#[async_trait]
impl PeriodicTask for SessionCleanupTask {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(60 * 60)
    }

    async fn run(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let removed = purge_stale_sessions(db).await?;
        if removed > 0 {
            tracing::info!(removed, "Cleaned up sessions");
        }
        Ok(())
    }
}

/// Switches off join links whose expiry has passed
pub struct JoinLinkExpiryTask;

#[async_trait]
impl PeriodicTask for JoinLinkExpiryTask {
    fn name(&self) -> &'static str {
        "join_link_expiry"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(15 * 60)
    }

    async fn run(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let expired = expire_join_links(db).await?;
        if expired > 0 {
            tracing::info!(expired, "Deactivated expired join links");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;

    #[test]
    fn test_task_schedule() {
        let tasks = default_tasks();
        let names: Vec<_> = tasks.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["session_cleanup", "join_link_expiry"]);
        assert_eq!(tasks[0].interval(), Duration::from_secs(3600));
        assert_eq!(tasks[1].interval(), Duration::from_secs(900));
    }

    #[tokio::test]
    async fn test_tasks_run_on_empty_database() {
        let db = create_test_db().await;
        for task in default_tasks() {
            task.run(&db).await.unwrap();
        }
    }
}
