//! Migration to create the operations table
//!
//! Operations are the work-order-scoped steps that get synced into the
//! part template library.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000002_create_work_orders::WorkOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Operations::Table)
                    .if_not_exists()
                    .col(pk_uuid(Operations::Id))
                    .col(uuid(Operations::WorkOrderId).not_null())
                    // Last template this operation was synced into. No FK: templates
                    // can be deleted from the part library without touching operations.
                    .col(uuid_null(Operations::TemplateId))
                    .col(string(Operations::Name).not_null())
                    .col(text_null(Operations::Description))
                    .col(string(Operations::Status).default("Not Started"))
                    .col(text_null(Operations::MachiningMethods))
                    .col(text_null(Operations::SetupInstructions))
                    .col(integer(Operations::Sequence).default(0))
                    .col(boolean(Operations::IsCustom).default(false))
                    .col(timestamp_with_time_zone_null(Operations::EstimatedStartTime))
                    .col(timestamp_with_time_zone_null(Operations::EstimatedEndTime))
                    .col(timestamp_with_time_zone_null(Operations::ActualStartTime))
                    .col(timestamp_with_time_zone_null(Operations::ActualEndTime))
                    .col(text_null(Operations::Comments))
                    .col(uuid_null(Operations::AssignedTo))
                    .col(timestamp_with_time_zone(Operations::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Operations::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operations_work_order")
                            .from(Operations::Table, Operations::WorkOrderId)
                            .to(WorkOrders::Table, WorkOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for listing a work order's operations in sequence order
        manager
            .create_index(
                Index::create()
                    .name("idx_operations_work_order_sequence")
                    .table(Operations::Table)
                    .col(Operations::WorkOrderId)
                    .col(Operations::Sequence)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Operations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Operations {
    Table,
    Id,
    WorkOrderId,
    TemplateId,
    Name,
    Description,
    Status,
    MachiningMethods,
    SetupInstructions,
    Sequence,
    IsCustom,
    EstimatedStartTime,
    EstimatedEndTime,
    ActualStartTime,
    ActualEndTime,
    Comments,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}
