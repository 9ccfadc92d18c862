pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_parts;
mod m20260301_000002_create_work_orders;
mod m20260301_000003_create_operation_templates;
mod m20260301_000004_create_operations;
mod m20260301_000005_create_document_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_parts::Migration),
            Box::new(m20260301_000002_create_work_orders::Migration),
            Box::new(m20260301_000003_create_operation_templates::Migration),
            Box::new(m20260301_000004_create_operations::Migration),
            Box::new(m20260301_000005_create_document_tables::Migration),
        ]
    }
}
