use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000001_create_parts::Parts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // part_id stays nullable: ad-hoc work orders are not tied to the part library
        manager
            .create_table(
                Table::create()
                    .table(WorkOrders::Table)
                    .if_not_exists()
                    .col(pk_uuid(WorkOrders::Id))
                    .col(string(WorkOrders::WorkOrderNumber).not_null())
                    .col(uuid_null(WorkOrders::PartId))
                    .col(timestamp_with_time_zone(WorkOrders::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_orders_part")
                            .from(WorkOrders::Table, WorkOrders::PartId)
                            .to(Parts::Table, Parts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_orders_part_id")
                    .table(WorkOrders::Table)
                    .col(WorkOrders::PartId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WorkOrders {
    Table,
    Id,
    WorkOrderNumber,
    PartId,
    CreatedAt,
}
