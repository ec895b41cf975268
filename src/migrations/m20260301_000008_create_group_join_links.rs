//! Migration: Create group_join_links table

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;
use super::m20260301_000003_create_organisations::Organisations;
use super::m20260301_000005_create_groups::Groups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GroupJoinLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupJoinLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupJoinLinks::GroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupJoinLinks::OrganisationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupJoinLinks::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(GroupJoinLinks::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(GroupJoinLinks::MaxUses).integer().null())
                    .col(
                        ColumnDef::new(GroupJoinLinks::UsesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GroupJoinLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(GroupJoinLinks::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(GroupJoinLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupJoinLinks::Table, GroupJoinLinks::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupJoinLinks::Table, GroupJoinLinks::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupJoinLinks::Table, GroupJoinLinks::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_join_links_group_active")
                    .table(GroupJoinLinks::Table)
                    .col(GroupJoinLinks::GroupId)
                    .col(GroupJoinLinks::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(GroupJoinLinks::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum GroupJoinLinks {
    Table,
    Id,
    #[iden = "group_id"]
    GroupId,
    #[iden = "organisation_id"]
    OrganisationId,
    Token,
    #[iden = "is_active"]
    IsActive,
    #[iden = "max_uses"]
    MaxUses,
    #[iden = "uses_count"]
    UsesCount,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "created_by"]
    CreatedBy,
    #[iden = "created_at"]
    CreatedAt,
}
