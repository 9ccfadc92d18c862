mod common;

use std::time::Duration;

use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use workorder_backend::config::{SyncMode, SyncSettings};
use workorder_backend::entities::prelude::{OperationDocuments, Operations};
use workorder_backend::error::ServiceError;
use workorder_backend::models::operation::{OperationStatus, OperationUpdate, SyncOptions};
use workorder_backend::models::template::NewTemplate;
use workorder_backend::services::operation_service::OperationService;
use workorder_backend::services::template_service::TemplateService;

use crate::common::*;

async fn setup(mode: SyncMode) -> (DatabaseConnection, OperationService, Uuid, Uuid) {
    let db = setup_test_db().await.expect("Failed to set up test DB");
    let part_id = insert_part(&db, "P-100").await;
    let work_order_id = insert_work_order(&db, Some(part_id)).await;
    let service = OperationService::new(
        db.clone(),
        SyncSettings {
            mode,
            ..Default::default()
        },
    );
    (db, service, part_id, work_order_id)
}

#[tokio::test]
async fn test_create_and_list_in_sequence_order() {
    let (_db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;

    let mut second = new_operation("Finish");
    second.sequence = 20;
    let mut first = new_operation("Rough");
    first.sequence = 10;

    service
        .create_operation(work_order_id, second, SyncOptions::default())
        .await
        .unwrap();
    let created = service
        .create_operation(work_order_id, first, SyncOptions::default())
        .await
        .unwrap();
    assert_eq!(created.status, OperationStatus::NotStarted);
    assert!(created.documents.is_empty());

    let operations = service
        .get_operations_by_work_order(work_order_id)
        .await
        .unwrap();
    let names: Vec<&str> = operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Rough", "Finish"]);
}

#[tokio::test]
async fn test_create_on_missing_work_order() {
    let (_db, service, _part_id, _work_order_id) = setup(SyncMode::Inline).await;
    let result = service
        .create_operation(Uuid::new_v4(), new_operation("Rough"), SyncOptions::default())
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let (_db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let result = service
        .create_operation(work_order_id, new_operation("  "), SyncOptions::default())
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_create_with_sync_creates_template() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Inline).await;

    let operation = service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::with_sync())
        .await
        .unwrap();

    let templates = templates_for_part(&db, part_id).await;
    assert_eq!(templates.len(), 1);
    assert_eq!(operation.template_id, Some(templates[0].id));
}

#[tokio::test]
async fn test_update_without_sync_leaves_templates_alone() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::default())
        .await
        .unwrap();

    let updated = service
        .update_operation(
            operation.id,
            OperationUpdate {
                status: Some(OperationStatus::InProgress),
                comments: Some(Some("started".to_string())),
                ..Default::default()
            },
            SyncOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(updated.status, OperationStatus::InProgress);
    assert_eq!(updated.comments.as_deref(), Some("started"));
    assert!(updated.updated_at >= operation.updated_at);
    assert_eq!(count_templates(&db).await, 0);
}

#[tokio::test]
async fn test_update_succeeds_when_document_mirror_fails() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::default())
        .await
        .unwrap();
    service
        .add_operation_document(operation.id, new_document("a.pdf"), SyncOptions::default())
        .await
        .unwrap();
    drop_table(&db, "template_documents").await;

    let updated = service
        .update_operation(
            operation.id,
            OperationUpdate {
                setup_instructions: Some(Some("Use soft jaws".to_string())),
                ..Default::default()
            },
            SyncOptions::with_sync(),
        )
        .await
        .expect("sync failure must not fail the update");

    assert_eq!(updated.setup_instructions.as_deref(), Some("Use soft jaws"));
    let row = Operations::find_by_id(operation.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.setup_instructions.as_deref(), Some("Use soft jaws"));
}

#[tokio::test]
async fn test_update_succeeds_when_template_write_fails() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::default())
        .await
        .unwrap();
    drop_table(&db, "operation_templates").await;

    let updated = service
        .update_operation(
            operation.id,
            OperationUpdate {
                sequence: Some(40),
                ..Default::default()
            },
            SyncOptions::with_sync(),
        )
        .await
        .expect("sync failure must not fail the update");
    assert_eq!(updated.sequence, 40);
}

#[tokio::test]
async fn test_update_missing_operation() {
    let (_db, service, _part_id, _work_order_id) = setup(SyncMode::Inline).await;
    let result = service
        .update_operation(Uuid::new_v4(), OperationUpdate::default(), SyncOptions::with_sync())
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_add_document_with_sync_mirrors_into_template() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Drilling"), SyncOptions::default())
        .await
        .unwrap();

    let document = service
        .add_operation_document(operation.id, new_document("drawing.pdf"), SyncOptions::with_sync())
        .await
        .unwrap();
    assert_eq!(document.url, "https://files.example/drawing.pdf");
    assert_eq!(document.size, Some(1024));

    let templates = templates_for_part(&db, part_id).await;
    assert_eq!(templates.len(), 1);
    assert_eq!(
        template_document_urls(&db, templates[0].id).await,
        vec!["https://files.example/drawing.pdf".to_string()]
    );
}

#[tokio::test]
async fn test_remove_document_with_sync_updates_template() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Drilling"), SyncOptions::default())
        .await
        .unwrap();
    service
        .add_operation_document(operation.id, new_document("a.pdf"), SyncOptions::with_sync())
        .await
        .unwrap();
    let b = service
        .add_operation_document(operation.id, new_document("b.pdf"), SyncOptions::with_sync())
        .await
        .unwrap();

    service
        .remove_operation_document(b.id, SyncOptions::with_sync())
        .await
        .unwrap();

    let templates = templates_for_part(&db, part_id).await;
    assert_eq!(
        template_document_urls(&db, templates[0].id).await,
        vec!["https://files.example/a.pdf".to_string()]
    );
}

#[tokio::test]
async fn test_remove_document_without_template_does_not_create_one() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Drilling"), SyncOptions::default())
        .await
        .unwrap();
    service
        .add_operation_document(operation.id, new_document("a.pdf"), SyncOptions::default())
        .await
        .unwrap();
    let b = service
        .add_operation_document(operation.id, new_document("b.pdf"), SyncOptions::default())
        .await
        .unwrap();

    service
        .remove_operation_document(b.id, SyncOptions::with_sync())
        .await
        .unwrap();

    assert_eq!(count_templates(&db).await, 0);
    let remaining = service.get_operation(operation.id).await.unwrap();
    assert_eq!(remaining.documents.len(), 1);
}

#[tokio::test]
async fn test_delete_operation_removes_documents() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Drilling"), SyncOptions::default())
        .await
        .unwrap();
    service
        .add_operation_document(operation.id, new_document("a.pdf"), SyncOptions::default())
        .await
        .unwrap();

    service.delete_operation(operation.id).await.unwrap();

    assert!(matches!(
        service.get_operation(operation.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(OperationDocuments::find().all(&db).await.unwrap().is_empty());
    assert!(matches!(
        service.delete_operation(operation.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_populate_from_templates() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Inline).await;
    let templates = TemplateService::new(db.clone());
    for (name, sequence) in [("Inspect", 30), ("Saw", 10), ("Mill", 20)] {
        let template = templates
            .create_template(
                part_id,
                NewTemplate {
                    name: name.to_string(),
                    description: None,
                    machining_methods: None,
                    setup_instructions: None,
                    sequence,
                    estimated_duration: None,
                },
            )
            .await
            .unwrap();
        if name == "Mill" {
            templates
                .add_template_document(template.id, new_document("mill-setup.pdf"))
                .await
                .unwrap();
        }
    }

    let operations = service
        .populate_operations_from_templates(work_order_id)
        .await
        .unwrap();

    let names: Vec<&str> = operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Saw", "Mill", "Inspect"]);
    assert!(operations.iter().all(|o| o.template_id.is_some()));
    assert!(operations.iter().all(|o| o.status == OperationStatus::NotStarted));
    let mill = &operations[1];
    assert_eq!(mill.documents.len(), 1);
    assert_eq!(mill.documents[0].url, "https://files.example/mill-setup.pdf");
}

#[tokio::test]
async fn test_populate_twice_adds_only_new_templates() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Inline).await;
    let templates = TemplateService::new(db.clone());
    let library_template = |name: &str, sequence| NewTemplate {
        name: name.to_string(),
        description: None,
        machining_methods: None,
        setup_instructions: None,
        sequence,
        estimated_duration: None,
    };
    templates
        .create_template(part_id, library_template("Saw", 10))
        .await
        .unwrap();

    let first = service
        .populate_operations_from_templates(work_order_id)
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    let again = service
        .populate_operations_from_templates(work_order_id)
        .await
        .unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].id, first[0].id);

    templates
        .create_template(part_id, library_template("Mill", 20))
        .await
        .unwrap();
    let operations = service
        .populate_operations_from_templates(work_order_id)
        .await
        .unwrap();
    let names: Vec<&str> = operations.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Saw", "Mill"]);
}

#[tokio::test]
async fn test_populate_without_part_returns_nothing() {
    let (db, service, _part_id, _work_order_id) = setup(SyncMode::Inline).await;
    let loose = insert_work_order(&db, None).await;
    let operations = service.populate_operations_from_templates(loose).await.unwrap();
    assert!(operations.is_empty());
}

#[tokio::test]
async fn test_background_sync_eventually_writes_template() {
    let (db, service, part_id, work_order_id) = setup(SyncMode::Background).await;

    service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::with_sync())
        .await
        .unwrap();

    let mut templates = Vec::new();
    for _ in 0..50 {
        templates = templates_for_part(&db, part_id).await;
        if !templates.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name, "Deburring");
}

#[tokio::test]
async fn test_sync_now_reports_failures() {
    let (db, service, _part_id, work_order_id) = setup(SyncMode::Inline).await;
    let operation = service
        .create_operation(work_order_id, new_operation("Deburring"), SyncOptions::default())
        .await
        .unwrap();

    let synced = service.sync_operation_now(operation.id, true).await.unwrap();
    assert!(synced.template_id.is_some());

    drop_table(&db, "template_documents").await;
    drop_table(&db, "operation_templates").await;
    assert!(matches!(
        service.sync_operation_now(operation.id, true).await,
        Err(ServiceError::Sync(_))
    ));
}
