//! Migration: Create sessions table
//!
//! One row per login. The id is a UUID string carried in the session cookie.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let timestamp = |column: Sessions| {
            ColumnDef::new(column)
                .timestamp_with_time_zone()
                .not_null()
                .to_owned()
        };

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Sessions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Sessions::UserAgent).string().null())
                    .col(ColumnDef::new(Sessions::IpAddress).string_len(64).null())
                    .col(timestamp(Sessions::CreatedAt))
                    .col(timestamp(Sessions::ExpiresAt))
                    .col(timestamp(Sessions::LastAccessedAt))
                    .col(
                        ColumnDef::new(Sessions::IsRevoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Cleanup scans by expiry, and by revocation plus last use
        for (name, columns) in [
            ("idx_sessions_user", vec![Sessions::UserId]),
            ("idx_sessions_expiry", vec![Sessions::ExpiresAt]),
            (
                "idx_sessions_revoked_last_access",
                vec![Sessions::IsRevoked, Sessions::LastAccessedAt],
            ),
        ] {
            let mut index = Index::create();
            index.name(name).table(Sessions::Table).if_not_exists();
            for column in columns {
                index.col(column);
            }
            manager.create_index(index.to_owned()).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum Sessions {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "user_agent"]
    UserAgent,
    #[iden = "ip_address"]
    IpAddress,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "last_accessed_at"]
    LastAccessedAt,
    #[iden = "is_revoked"]
    IsRevoked,
}
