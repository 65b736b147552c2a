//! Initial schema migration - creates the register tables.
//!
//! - `users`: authentication
//! - `cash_transactions`: manual ledger entries
//! - `sales`: customer orders read by the register
//! - `cash_closings`: append-only register closings

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum CashTransactions {
    Table,
    Id,
    OccurredAt,
    Kind,
    AmountMinor,
    Currency,
    Description,
    CreatedBy,
    Reference,
    Category,
    Receivable,
    IsDebt,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    OrderNumber,
    Customer,
    Status,
    TotalMinor,
    Currency,
    PaymentDetails,
    CreatedAt,
    PaidAt,
}

#[derive(Iden)]
enum CashClosings {
    Table,
    Id,
    BusinessDate,
    ClosedAt,
    ClosedBy,
    Status,
    DifferenceMinor,
    CountedMinor,
    CalculatedMinor,
    Currency,
    Notes,
    Balance,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Cash transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(CashTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Currency)
                            .string()
                            .not_null()
                            .default("PESO"),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashTransactions::CreatedBy).string().not_null())
                    .col(ColumnDef::new(CashTransactions::Reference).string())
                    .col(ColumnDef::new(CashTransactions::Category).string())
                    .col(
                        ColumnDef::new(CashTransactions::Receivable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CashTransactions::IsDebt)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_transactions-occurred_at")
                    .table(CashTransactions::Table)
                    .col(CashTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Sales
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Sales::OrderNumber).string().not_null())
                    .col(ColumnDef::new(Sales::Customer).string())
                    .col(
                        ColumnDef::new(Sales::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Sales::TotalMinor).big_integer().not_null())
                    .col(ColumnDef::new(Sales::Currency).string())
                    .col(ColumnDef::new(Sales::PaymentDetails).text())
                    .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sales::PaidAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sales-order_number-unique")
                    .table(Sales::Table)
                    .col(Sales::OrderNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sales-status-paid_at")
                    .table(Sales::Table)
                    .col(Sales::Status)
                    .col(Sales::PaidAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Cash closings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashClosings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashClosings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashClosings::BusinessDate).date().not_null())
                    .col(ColumnDef::new(CashClosings::ClosedAt).timestamp().not_null())
                    .col(ColumnDef::new(CashClosings::ClosedBy).string().not_null())
                    .col(ColumnDef::new(CashClosings::Status).string().not_null())
                    .col(
                        ColumnDef::new(CashClosings::DifferenceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashClosings::CountedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashClosings::CalculatedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashClosings::Currency).string())
                    .col(ColumnDef::new(CashClosings::Notes).string())
                    .col(ColumnDef::new(CashClosings::Balance).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_closings-closed_at")
                    .table(CashClosings::Table)
                    .col(CashClosings::ClosedAt)
                    .col(CashClosings::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(CashClosings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
