#![allow(dead_code)]

use chrono::{DateTime, Utc};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use workorder_backend::entities::{
    operation_templates, parts,
    prelude::{OperationTemplates, TemplateDocuments},
    template_documents, work_orders,
};
use workorder_backend::models::document::NewDocument;
use workorder_backend::models::operation::NewOperation;

/// Set up a migrated in-memory test database.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn insert_part(db: &DatabaseConnection, part_number: &str) -> Uuid {
    let id = Uuid::new_v4();
    parts::ActiveModel {
        id: Set(id),
        part_number: Set(part_number.to_string()),
        name: Set(format!("Part {}", part_number)),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await
    .expect("Failed to insert part");
    id
}

pub async fn insert_work_order(db: &DatabaseConnection, part_id: Option<Uuid>) -> Uuid {
    let id = Uuid::new_v4();
    work_orders::ActiveModel {
        id: Set(id),
        work_order_number: Set(format!("WO-{}", &id.to_string()[..8])),
        part_id: Set(part_id),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await
    .expect("Failed to insert work order");
    id
}

pub fn new_operation(name: &str) -> NewOperation {
    NewOperation {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        machining_methods: Some("3-axis".to_string()),
        setup_instructions: Some("Clamp in vise".to_string()),
        sequence: 10,
        ..Default::default()
    }
}

pub fn new_document(name: &str) -> NewDocument {
    NewDocument {
        name: name.to_string(),
        url: format!("https://files.example/{}", name),
        file_type: "application/pdf".to_string(),
        uploaded_at: None,
        size: Some(1024),
    }
}

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub async fn templates_for_part(
    db: &DatabaseConnection,
    part_id: Uuid,
) -> Vec<operation_templates::Model> {
    OperationTemplates::find()
        .filter(operation_templates::Column::PartId.eq(part_id))
        .order_by_asc(operation_templates::Column::CreatedAt)
        .all(db)
        .await
        .expect("Failed to query templates")
}

/// Template document URLs, sorted
pub async fn template_document_urls(db: &DatabaseConnection, template_id: Uuid) -> Vec<String> {
    let mut urls: Vec<String> = TemplateDocuments::find()
        .filter(template_documents::Column::TemplateId.eq(template_id))
        .all(db)
        .await
        .expect("Failed to query template documents")
        .into_iter()
        .map(|d| d.url)
        .collect();
    urls.sort();
    urls
}

pub async fn count_templates(db: &DatabaseConnection) -> u64 {
    use sea_orm::PaginatorTrait;
    OperationTemplates::find()
        .count(db)
        .await
        .expect("Failed to count templates")
}

pub async fn drop_table(db: &DatabaseConnection, table: &str) {
    db.execute_unprepared(&format!("DROP TABLE {}", table))
        .await
        .expect("Failed to drop table");
}
