//! Record mapper between SeaORM rows and the domain models
//!
//! Pure translation, no database access. Timestamps are stored with a time
//! zone and surfaced as UTC.

use chrono::{DateTime, Utc};
use sea_orm::{prelude::DateTimeWithTimeZone, Set};
use uuid::Uuid;

use super::document::{Document, NewDocument};
use super::operation::{NewOperation, Operation, OperationSnapshot, OperationStatus, OperationUpdate};
use super::template::{OperationTemplate, TemplateFields};
use crate::entities::{
    operation_documents, operation_templates, operations, template_documents,
};

/// Current time in the storage representation
pub fn timestamp_now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

fn to_utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

fn to_stored(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.fixed_offset()
}

impl From<operation_documents::Model> for Document {
    fn from(model: operation_documents::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            file_type: model.file_type,
            uploaded_at: to_utc(model.uploaded_at),
            size: model.size,
        }
    }
}

impl From<template_documents::Model> for Document {
    fn from(model: template_documents::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            file_type: model.file_type,
            uploaded_at: to_utc(model.uploaded_at),
            size: model.size,
        }
    }
}

/// Build the domain operation from its row and document rows.
///
/// Fails only when the stored status label is unknown.
pub fn operation_from_model(
    model: operations::Model,
    documents: Vec<operation_documents::Model>,
) -> Result<Operation, String> {
    let status: OperationStatus = model.status.parse()?;

    Ok(Operation {
        id: model.id,
        work_order_id: model.work_order_id,
        template_id: model.template_id,
        name: model.name,
        description: model.description,
        status,
        machining_methods: model.machining_methods,
        setup_instructions: model.setup_instructions,
        sequence: model.sequence,
        is_custom: model.is_custom,
        estimated_start_time: model.estimated_start_time.map(to_utc),
        estimated_end_time: model.estimated_end_time.map(to_utc),
        actual_start_time: model.actual_start_time.map(to_utc),
        actual_end_time: model.actual_end_time.map(to_utc),
        comments: model.comments,
        assigned_to: model.assigned_to,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
        documents: documents.into_iter().map(Document::from).collect(),
    })
}

pub fn template_from_model(
    model: operation_templates::Model,
    documents: Vec<template_documents::Model>,
) -> OperationTemplate {
    OperationTemplate {
        id: model.id,
        part_id: model.part_id,
        name: model.name,
        description: model.description,
        machining_methods: model.machining_methods,
        setup_instructions: model.setup_instructions,
        sequence: model.sequence,
        estimated_duration: model.estimated_duration,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
        documents: documents.into_iter().map(Document::from).collect(),
    }
}

/// Snapshot of the sync-relevant columns of a stored operation
pub fn snapshot_from_operation(model: &operations::Model) -> OperationSnapshot {
    OperationSnapshot {
        name: model.name.clone(),
        description: model.description.clone(),
        machining_methods: model.machining_methods.clone(),
        setup_instructions: model.setup_instructions.clone(),
        sequence: model.sequence,
        actual_start_time: model.actual_start_time.map(to_utc),
        actual_end_time: model.actual_end_time.map(to_utc),
    }
}

/// Template columns for a sync, named after the operation being synced
pub fn template_fields(
    operation_name: &str,
    snapshot: &OperationSnapshot,
    estimated_duration: Option<i32>,
) -> TemplateFields {
    TemplateFields {
        name: operation_name.to_string(),
        description: snapshot.description.clone(),
        machining_methods: snapshot.machining_methods.clone(),
        setup_instructions: snapshot.setup_instructions.clone(),
        sequence: snapshot.sequence,
        estimated_duration,
    }
}

pub fn new_template(
    id: Uuid,
    part_id: Uuid,
    fields: TemplateFields,
    now: DateTimeWithTimeZone,
) -> operation_templates::ActiveModel {
    operation_templates::ActiveModel {
        id: Set(id),
        part_id: Set(part_id),
        name: Set(fields.name),
        description: Set(fields.description),
        machining_methods: Set(fields.machining_methods),
        setup_instructions: Set(fields.setup_instructions),
        sequence: Set(fields.sequence),
        estimated_duration: Set(fields.estimated_duration),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Overwrite every synced column on an existing template
pub fn apply_template_fields(
    active: &mut operation_templates::ActiveModel,
    fields: TemplateFields,
    now: DateTimeWithTimeZone,
) {
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.machining_methods = Set(fields.machining_methods);
    active.setup_instructions = Set(fields.setup_instructions);
    active.sequence = Set(fields.sequence);
    active.estimated_duration = Set(fields.estimated_duration);
    active.updated_at = Set(now);
}

pub fn new_operation(
    id: Uuid,
    work_order_id: Uuid,
    request: NewOperation,
    now: DateTimeWithTimeZone,
) -> operations::ActiveModel {
    operations::ActiveModel {
        id: Set(id),
        work_order_id: Set(work_order_id),
        template_id: Set(None),
        name: Set(request.name),
        description: Set(request.description),
        status: Set(request.status.to_string()),
        machining_methods: Set(request.machining_methods),
        setup_instructions: Set(request.setup_instructions),
        sequence: Set(request.sequence),
        is_custom: Set(request.is_custom),
        estimated_start_time: Set(request.estimated_start_time.map(to_stored)),
        estimated_end_time: Set(request.estimated_end_time.map(to_stored)),
        actual_start_time: Set(request.actual_start_time.map(to_stored)),
        actual_end_time: Set(request.actual_end_time.map(to_stored)),
        comments: Set(request.comments),
        assigned_to: Set(request.assigned_to),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// A fresh operation pre-populated from a template
pub fn operation_from_template(
    id: Uuid,
    work_order_id: Uuid,
    template: &operation_templates::Model,
    now: DateTimeWithTimeZone,
) -> operations::ActiveModel {
    operations::ActiveModel {
        id: Set(id),
        work_order_id: Set(work_order_id),
        template_id: Set(Some(template.id)),
        name: Set(template.name.clone()),
        description: Set(template.description.clone()),
        status: Set(OperationStatus::NotStarted.to_string()),
        machining_methods: Set(template.machining_methods.clone()),
        setup_instructions: Set(template.setup_instructions.clone()),
        sequence: Set(template.sequence),
        is_custom: Set(false),
        estimated_start_time: Set(None),
        estimated_end_time: Set(None),
        actual_start_time: Set(None),
        actual_end_time: Set(None),
        comments: Set(None),
        assigned_to: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Apply the fields present in `update`; returns whether anything was set
pub fn apply_operation_update(active: &mut operations::ActiveModel, update: OperationUpdate) -> bool {
    let mut changed = false;
    macro_rules! set_if_present {
        ($field:ident) => {
            if let Some(value) = update.$field {
                active.$field = Set(value);
                changed = true;
            }
        };
        ($field:ident, $convert:expr) => {
            if let Some(value) = update.$field {
                active.$field = Set($convert(value));
                changed = true;
            }
        };
    }

    set_if_present!(name);
    set_if_present!(description);
    set_if_present!(status, |s: OperationStatus| s.to_string());
    set_if_present!(machining_methods);
    set_if_present!(setup_instructions);
    set_if_present!(sequence);
    set_if_present!(is_custom);
    set_if_present!(estimated_start_time, |t: Option<DateTime<Utc>>| t.map(to_stored));
    set_if_present!(estimated_end_time, |t: Option<DateTime<Utc>>| t.map(to_stored));
    set_if_present!(actual_start_time, |t: Option<DateTime<Utc>>| t.map(to_stored));
    set_if_present!(actual_end_time, |t: Option<DateTime<Utc>>| t.map(to_stored));
    set_if_present!(comments);
    set_if_present!(assigned_to);

    changed
}

pub fn new_operation_document(
    operation_id: Uuid,
    request: NewDocument,
    now: DateTimeWithTimeZone,
) -> operation_documents::ActiveModel {
    operation_documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        operation_id: Set(operation_id),
        name: Set(request.name),
        url: Set(request.url),
        file_type: Set(request.file_type),
        uploaded_at: Set(request.uploaded_at.map(to_stored).unwrap_or(now)),
        size: Set(request.size),
    }
}

pub fn new_template_document(
    template_id: Uuid,
    request: NewDocument,
    now: DateTimeWithTimeZone,
) -> template_documents::ActiveModel {
    template_documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_id: Set(template_id),
        name: Set(request.name),
        url: Set(request.url),
        file_type: Set(request.file_type),
        uploaded_at: Set(request.uploaded_at.map(to_stored).unwrap_or(now)),
        size: Set(request.size),
    }
}

/// Copy of an operation document stamped with the template id
pub fn template_document_copy(
    document: &operation_documents::Model,
    template_id: Uuid,
) -> template_documents::ActiveModel {
    template_documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_id: Set(template_id),
        name: Set(document.name.clone()),
        url: Set(document.url.clone()),
        file_type: Set(document.file_type.clone()),
        uploaded_at: Set(document.uploaded_at),
        size: Set(document.size),
    }
}

/// Copy of a template document stamped with the operation id
pub fn operation_document_copy(
    document: &template_documents::Model,
    operation_id: Uuid,
) -> operation_documents::ActiveModel {
    operation_documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        operation_id: Set(operation_id),
        name: Set(document.name.clone()),
        url: Set(document.url.clone()),
        file_type: Set(document.file_type.clone()),
        uploaded_at: Set(document.uploaded_at),
        size: Set(document.size),
    }
}

/// True when a template document already carries the operation document's metadata
pub fn document_matches(
    template_document: &template_documents::Model,
    operation_document: &operation_documents::Model,
) -> bool {
    template_document.url == operation_document.url
        && template_document.name == operation_document.name
        && template_document.file_type == operation_document.file_type
        && template_document.uploaded_at == operation_document.uploaded_at
        && template_document.size == operation_document.size
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn operation_row() -> operations::Model {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap().fixed_offset();
        operations::Model {
            id: Uuid::new_v4(),
            work_order_id: Uuid::new_v4(),
            template_id: None,
            name: "Deburring".to_string(),
            description: Some("Remove burrs".to_string()),
            status: "In Progress".to_string(),
            machining_methods: Some("hand file".to_string()),
            setup_instructions: None,
            sequence: 30,
            is_custom: false,
            estimated_start_time: None,
            estimated_end_time: None,
            actual_start_time: Some(created),
            actual_end_time: None,
            comments: None,
            assigned_to: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_operation_from_model() {
        let row = operation_row();
        let id = row.id;
        let operation = operation_from_model(row, vec![]).unwrap();
        assert_eq!(operation.id, id);
        assert_eq!(operation.status, OperationStatus::InProgress);
        assert_eq!(operation.sequence, 30);
        assert!(operation.documents.is_empty());
    }

    #[test]
    fn test_operation_from_model_rejects_unknown_status() {
        let mut row = operation_row();
        row.status = "Shipped".to_string();
        assert!(operation_from_model(row, vec![]).is_err());
    }

    #[test]
    fn test_snapshot_and_fields_use_operation_name() {
        let row = operation_row();
        let snapshot = snapshot_from_operation(&row);
        assert_eq!(snapshot.name, "Deburring");
        assert_eq!(snapshot.actual_start_time, row.actual_start_time.map(to_utc));

        let fields = template_fields("Deburring", &snapshot, Some(4));
        assert_eq!(fields.name, "Deburring");
        assert_eq!(fields.machining_methods.as_deref(), Some("hand file"));
        assert_eq!(fields.sequence, 30);
        assert_eq!(fields.estimated_duration, Some(4));
    }

    #[test]
    fn test_apply_operation_update_only_touches_present_fields() {
        let mut active: operations::ActiveModel = operation_row().into();
        let update = OperationUpdate {
            comments: Some(Some("checked".to_string())),
            actual_start_time: Some(None),
            ..Default::default()
        };
        assert!(apply_operation_update(&mut active, update));
        assert_eq!(active.comments, Set(Some("checked".to_string())));
        assert_eq!(active.actual_start_time, Set(None));
        assert!(!active.name.is_set());

        assert!(!apply_operation_update(&mut active, OperationUpdate::default()));
    }

    #[test]
    fn test_template_document_copy_keeps_metadata() {
        let uploaded = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap().fixed_offset();
        let source = operation_documents::Model {
            id: Uuid::new_v4(),
            operation_id: Uuid::new_v4(),
            name: "drawing.pdf".to_string(),
            url: "https://files.example/drawing.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            uploaded_at: uploaded,
            size: Some(2048),
        };
        let template_id = Uuid::new_v4();
        let copy = template_document_copy(&source, template_id);
        assert_eq!(copy.template_id, Set(template_id));
        assert_eq!(copy.url, Set(source.url.clone()));
        assert_eq!(copy.uploaded_at, Set(uploaded));
        assert_eq!(copy.size, Set(Some(2048)));
        assert_ne!(copy.id, Set(source.id));
    }
}
