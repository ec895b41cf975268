//! Migration: Create organisation_admins junction table

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;
use super::m20260301_000003_create_organisations::Organisations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrganisationAdmins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganisationAdmins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganisationAdmins::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationAdmins::OrganisationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganisationAdmins::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OrganisationAdmins::Table, OrganisationAdmins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                OrganisationAdmins::Table,
                                OrganisationAdmins::OrganisationId,
                            )
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organisation_admins_user_org")
                    .table(OrganisationAdmins::Table)
                    .col(OrganisationAdmins::UserId)
                    .col(OrganisationAdmins::OrganisationId)
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
                    .table(OrganisationAdmins::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum OrganisationAdmins {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "organisation_id"]
    OrganisationId,
    #[iden = "assigned_at"]
    AssignedAt,
}
