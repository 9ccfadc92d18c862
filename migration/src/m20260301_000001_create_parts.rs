//! Migration to create the parts table
//!
//! Parts own the operation template library.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Parts::Table)
                    .if_not_exists()
                    .col(pk_uuid(Parts::Id))
                    .col(string(Parts::PartNumber).not_null())
                    .col(string(Parts::Name).not_null())
                    .col(timestamp_with_time_zone(Parts::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parts_part_number")
                    .table(Parts::Table)
                    .col(Parts::PartNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Parts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Parts {
    Table,
    Id,
    PartNumber,
    Name,
    CreatedAt,
}
