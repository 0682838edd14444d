//! Expense ledger table.
//!
//! `price` holds integer cents, the 2-digit scale decimal of the ledger.
//! Prices never exceed `9999999.99` in magnitude; the ledger checks that
//! before writing.
//! `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExpensesEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpensesEntry::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpensesEntry::EntryDate).date().not_null())
                    .col(ColumnDef::new(ExpensesEntry::Name).string_len(50).not_null())
                    .col(ColumnDef::new(ExpensesEntry::Price).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses_entry-entry_date")
                    .table(ExpensesEntry::Table)
                    .col(ExpensesEntry::EntryDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpensesEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ExpensesEntry {
    Table,
    Id,
    EntryDate,
    Name,
    Price,
}
