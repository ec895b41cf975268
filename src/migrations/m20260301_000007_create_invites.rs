//! Migration: Create invites table

use sea_orm_migration::prelude::*;

use super::m20260301_000005_create_groups::Groups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invites::GroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invites::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Invites::Email).string().null())
                    .col(
                        ColumnDef::new(Invites::Status)
                            .string_len(16)
                            .not_null()
                            .default("invited"),
                    )
                    .col(
                        ColumnDef::new(Invites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invites::JoinedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Invites::Table, Invites::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invites_group_id")
                    .table(Invites::Table)
                    .col(Invites::GroupId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invites::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invites {
    Table,
    Id,
    #[iden = "group_id"]
    GroupId,
    Token,
    Email,
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "joined_at"]
    JoinedAt,
}
