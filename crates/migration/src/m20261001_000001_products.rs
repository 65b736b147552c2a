//! Product catalog tables.
//!
//! `products` and `product_mirror` share one layout. Every column but the id
//! is nullable: rows imported from older catalogs may miss any field.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden, Clone, Copy)]
enum Products {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum ProductMirror {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum Product {
    Id,
    LegacyId,
    Code,
    Name,
    NameNorm,
    Description,
    Category,
    PriceMinor,
    Currency,
    Stock,
    Active,
    Images,
    CreatedAt,
    UpdatedAt,
}

fn product_table<T: Iden + 'static>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Product::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Product::LegacyId).string())
        .col(ColumnDef::new(Product::Code).string())
        .col(ColumnDef::new(Product::Name).string())
        .col(ColumnDef::new(Product::NameNorm).string())
        .col(ColumnDef::new(Product::Description).text())
        .col(ColumnDef::new(Product::Category).string())
        .col(ColumnDef::new(Product::PriceMinor).big_integer())
        .col(ColumnDef::new(Product::Currency).string())
        .col(ColumnDef::new(Product::Stock).big_integer())
        .col(ColumnDef::new(Product::Active).boolean())
        .col(ColumnDef::new(Product::Images).text())
        .col(ColumnDef::new(Product::CreatedAt).timestamp())
        .col(ColumnDef::new(Product::UpdatedAt).timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(product_table(Products::Table)).await?;
        manager
            .create_table(product_table(ProductMirror::Table))
            .await?;

        for (name, col) in [
            ("idx-products-legacy_id", Product::LegacyId),
            ("idx-products-code", Product::Code),
            ("idx-products-name_norm", Product::NameNorm),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Products::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx-product_mirror-legacy_id")
                    .table(ProductMirror::Table)
                    .col(Product::LegacyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductMirror::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        Ok(())
    }
}
