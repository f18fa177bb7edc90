//! Migration: Create documents table.
//!
//! Document metadata only; file bytes live in object storage under `file_key`.

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
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Documents::DocType).string_len(20).not_null())
                    .col(ColumnDef::new(Documents::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::Description).text())
                    .col(ColumnDef::new(Documents::FileKey).string_len(500).not_null())
                    .col(ColumnDef::new(Documents::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::MimeType).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::FileSize).big_integer().not_null())
                    .col(
                        ColumnDef::new(Documents::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Documents::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Documents::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Documents::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_owner")
                            .from(Documents::Table, Documents::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing by (owner, type) and default clearing both go through this index
        manager
            .create_index(
                Index::create()
                    .name("idx_documents_owner_type")
                    .table(Documents::Table)
                    .col(Documents::OwnerId)
                    .col(Documents::DocType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    OwnerId,
    DocType,
    Title,
    Description,
    FileKey,
    FileName,
    MimeType,
    FileSize,
    Version,
    IsDefault,
    IsArchived,
    LastUsedAt,
    CreatedAt,
    UpdatedAt,
}
