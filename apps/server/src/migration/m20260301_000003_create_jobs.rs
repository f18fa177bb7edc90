//! Migration: Create jobs table.
//!
//! `job_url` uniqueness per owner is enforced on create only, so the index
//! is not unique.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Jobs::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Jobs::Company).string_len(255).not_null())
                    .col(ColumnDef::new(Jobs::Country).string_len(100).not_null())
                    .col(ColumnDef::new(Jobs::City).string_len(100).not_null())
                    .col(ColumnDef::new(Jobs::JobUrl).string_len(2048))
                    .col(ColumnDef::new(Jobs::Description).text())
                    .col(ColumnDef::new(Jobs::Notes).text())
                    .col(
                        ColumnDef::new(Jobs::Status)
                            .string_len(20)
                            .not_null()
                            .default("wishlist"),
                    )
                    .col(
                        ColumnDef::new(Jobs::ApplicationDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Jobs::Documents).json_binary().not_null())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_owner")
                            .from(Jobs::Table, Jobs::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_owner_url")
                    .table(Jobs::Table)
                    .col(Jobs::OwnerId)
                    .col(Jobs::JobUrl)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    OwnerId,
    Title,
    Company,
    Country,
    City,
    JobUrl,
    Description,
    Notes,
    Status,
    ApplicationDate,
    Documents,
    CreatedAt,
    UpdatedAt,
}
