//! Deleted product ids.
//!
//! Mirror deletes are best effort, so a deleted product can linger in
//! `product_mirror`. Lookups skip mirror rows whose id is listed here.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ProductTombstones {
    Table,
    Id,
    DeletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductTombstones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductTombstones::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductTombstones::DeletedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductTombstones::Table).to_owned())
            .await
    }
}
