//! Migration: Create groups table

use sea_orm_migration::prelude::*;

use super::m20260301_000003_create_organisations::Organisations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Groups::OrganisationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::Description).text().null())
                    .col(
                        ColumnDef::new(Groups::GroupType)
                            .string_len(32)
                            .not_null()
                            .default("organisation_connection"),
                    )
                    .col(ColumnDef::new(Groups::AudienceDescription).text().null())
                    .col(
                        ColumnDef::new(Groups::Cadence)
                            .string_len(16)
                            .not_null()
                            .default("weekly"),
                    )
                    .col(
                        ColumnDef::new(Groups::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Groups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Groups::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_groups_organisation_id")
                    .table(Groups::Table)
                    .col(Groups::OrganisationId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Groups::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Groups {
    Table,
    Id,
    #[iden = "organisation_id"]
    OrganisationId,
    Name,
    Description,
    #[iden = "group_type"]
    GroupType,
    #[iden = "audience_description"]
    AudienceDescription,
    Cadence,
    #[iden = "is_active"]
    IsActive,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
