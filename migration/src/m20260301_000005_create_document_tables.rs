//! Migration to create the document reference tables
//!
//! Both tables hold file references (the blobs themselves live in object
//! storage). Rows cascade with their owning operation / template.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000003_create_operation_templates::OperationTemplates;
use super::m20260301_000004_create_operations::Operations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperationDocuments::Table)
                    .if_not_exists()
                    .col(pk_uuid(OperationDocuments::Id))
                    .col(uuid(OperationDocuments::OperationId).not_null())
                    .col(string(OperationDocuments::Name).not_null())
                    .col(text(OperationDocuments::Url).not_null())
                    .col(string(OperationDocuments::FileType).not_null())
                    .col(timestamp_with_time_zone(OperationDocuments::UploadedAt).default(Expr::current_timestamp()))
                    .col(big_integer_null(OperationDocuments::Size))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_operation_documents_operation")
                            .from(OperationDocuments::Table, OperationDocuments::OperationId)
                            .to(Operations::Table, Operations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_operation_documents_operation_id")
                    .table(OperationDocuments::Table)
                    .col(OperationDocuments::OperationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateDocuments::Table)
                    .if_not_exists()
                    .col(pk_uuid(TemplateDocuments::Id))
                    .col(uuid(TemplateDocuments::TemplateId).not_null())
                    .col(string(TemplateDocuments::Name).not_null())
                    .col(text(TemplateDocuments::Url).not_null())
                    .col(string(TemplateDocuments::FileType).not_null())
                    .col(timestamp_with_time_zone(TemplateDocuments::UploadedAt).default(Expr::current_timestamp()))
                    .col(big_integer_null(TemplateDocuments::Size))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_documents_template")
                            .from(TemplateDocuments::Table, TemplateDocuments::TemplateId)
                            .to(OperationTemplates::Table, OperationTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_template_documents_template_id")
                    .table(TemplateDocuments::Table)
                    .col(TemplateDocuments::TemplateId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperationDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OperationDocuments {
    Table,
    Id,
    OperationId,
    Name,
    Url,
    FileType,
    UploadedAt,
    Size,
}

#[derive(DeriveIden)]
enum TemplateDocuments {
    Table,
    Id,
    TemplateId,
    Name,
    Url,
    FileType,
    UploadedAt,
    Size,
}
