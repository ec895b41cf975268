pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_sessions;
mod m20260301_000003_create_organisations;
mod m20260301_000004_create_organisation_admins;
mod m20260301_000005_create_groups;
mod m20260301_000006_create_group_members;
mod m20260301_000007_create_invites;
mod m20260301_000008_create_group_join_links;
mod m20260301_000009_create_join_link_redemptions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_sessions::Migration),
            Box::new(m20260301_000003_create_organisations::Migration),
            Box::new(m20260301_000004_create_organisation_admins::Migration),
            Box::new(m20260301_000005_create_groups::Migration),
            Box::new(m20260301_000006_create_group_members::Migration),
            Box::new(m20260301_000007_create_invites::Migration),
            Box::new(m20260301_000008_create_group_join_links::Migration),
            Box::new(m20260301_000009_create_join_link_redemptions::Migration),
        ]
    }
}
