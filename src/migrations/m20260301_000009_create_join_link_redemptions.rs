//! Migration: Create group_join_link_redemptions table

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;
use super::m20260301_000008_create_group_join_links::GroupJoinLinks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Redemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Redemptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Redemptions::JoinLinkId).big_integer().not_null())
                    .col(ColumnDef::new(Redemptions::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Redemptions::RedeemedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Redemptions::Table, Redemptions::JoinLinkId)
                            .to(GroupJoinLinks::Table, GroupJoinLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Redemptions::Table, Redemptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_join_link_redemptions_link_user")
                    .table(Redemptions::Table)
                    .col(Redemptions::JoinLinkId)
                    .col(Redemptions::UserId)
                    .unique()
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
                    .table(Redemptions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Redemptions {
    #[iden = "group_join_link_redemptions"]
    Table,
    Id,
    #[iden = "join_link_id"]
    JoinLinkId,
    #[iden = "user_id"]
    UserId,
    #[iden = "redeemed_at"]
    RedeemedAt,
}
