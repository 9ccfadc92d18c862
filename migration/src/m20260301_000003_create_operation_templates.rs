//! Migration to create the part-scoped operation template library
//!
//! Templates are addressed by the natural key (part_id, name). The unique
//! index lets template creation run as insert-if-absent.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000001_create_parts::Parts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperationTemplates::Table)
                    .if_not_exists()
                    .col(pk_uuid(OperationTemplates::Id))
                    .col(uuid(OperationTemplates::PartId).not_null())
                    .col(string(OperationTemplates::Name).not_null())
                    .col(text_null(OperationTemplates::Description))
                    .col(text_null(OperationTemplates::MachiningMethods))
                    .col(text_null(OperationTemplates::SetupInstructions))
                    .col(integer(OperationTemplates::Sequence).default(0))
                    .col(integer_null(OperationTemplates::EstimatedDuration))
                    .col(timestamp_with_time_zone(OperationTemplates::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(OperationTemplates::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operation_templates_part")
                            .from(OperationTemplates::Table, OperationTemplates::PartId)
                            .to(Parts::Table, Parts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key (case-sensitive)
        manager
            .create_index(
                Index::create()
                    .name("idx_operation_templates_part_name")
                    .table(OperationTemplates::Table)
                    .col(OperationTemplates::PartId)
                    .col(OperationTemplates::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationTemplates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OperationTemplates {
    Table,
    Id,
    PartId,
    Name,
    Description,
    MachiningMethods,
    SetupInstructions,
    Sequence,
    EstimatedDuration,
    CreatedAt,
    UpdatedAt,
}
