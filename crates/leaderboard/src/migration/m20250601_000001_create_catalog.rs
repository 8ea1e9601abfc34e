//! Initial migration creating the catalog table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogEntries::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    // Naming
                    .col(ColumnDef::new(CatalogEntries::Name).string().not_null())
                    .col(ColumnDef::new(CatalogEntries::FullName).string().not_null())
                    .col(ColumnDef::new(CatalogEntries::Description).text().null())
                    .col(ColumnDef::new(CatalogEntries::HtmlUrl).text().not_null())
                    // Statistics
                    .col(
                        ColumnDef::new(CatalogEntries::Stars)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CatalogEntries::Forks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Ownership
                    .col(ColumnDef::new(CatalogEntries::Owner).string().not_null())
                    .col(
                        ColumnDef::new(CatalogEntries::OwnerAvatar)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CatalogEntries::Tier)
                            .string()
                            .not_null()
                            .default("community"),
                    )
                    .col(
                        ColumnDef::new(CatalogEntries::Topics)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(CatalogEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CatalogEntries::FirstSeenAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CatalogEntries::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_entries_tier")
                    .table(CatalogEntries::Table)
                    .col(CatalogEntries::Tier)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_entries_stars")
                    .table(CatalogEntries::Table)
                    .col(CatalogEntries::Stars)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "catalog_entries")]
enum CatalogEntries {
    Table,
    Id,
    Name,
    FullName,
    Description,
    HtmlUrl,
    Stars,
    Forks,
    Owner,
    OwnerAvatar,
    Tier,
    Topics,
    UpdatedAt,
    FirstSeenAt,
    LastSyncedAt,
}
