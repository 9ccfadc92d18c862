//! Template document mirror
//!
//! Makes a template's document set a copy of an operation's document set.
//! The default strategy is a full replace: every template document is
//! deleted and the operation's documents are reinserted. Documents attached
//! directly to the template are lost on the next sync from any matching
//! operation. The delete and the reinsert are separate statements, so a
//! concurrent reader can observe an empty set mid-sync.
//!
//! An operation without documents leaves the template's documents untouched.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DocumentMirrorStrategy;
use crate::entities::{
    operation_documents, operation_templates, template_documents,
    prelude::{OperationDocuments, Operations, TemplateDocuments},
};
use crate::error::SyncError;
use crate::models::mapper;
use crate::services::template_resolver;
use crate::services::template_sync::{
    estimated_duration_minutes, record_template_link, write_template,
};

/// Outcome of one mirror run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

#[derive(Clone)]
pub struct DocumentMirror {
    db: DatabaseConnection,
    strategy: DocumentMirrorStrategy,
}

impl DocumentMirror {
    pub fn new(db: DatabaseConnection, strategy: DocumentMirrorStrategy) -> Self {
        Self { db, strategy }
    }

    /// Mirror the operation's documents into the template `(part_id, operation_name)`,
    /// creating the template from the current operation row if it does not exist yet
    pub async fn sync_operation_documents(
        &self,
        operation_id: Uuid,
        part_id: Uuid,
        operation_name: &str,
    ) -> Result<(), SyncError> {
        let Some(template) = self
            .target_template(operation_id, part_id, operation_name)
            .await?
        else {
            return Ok(());
        };

        self.mirror_into(operation_id, &template).await
    }

    /// Mirror the operation's documents into an already resolved template
    pub async fn mirror_into(
        &self,
        operation_id: Uuid,
        template: &operation_templates::Model,
    ) -> Result<(), SyncError> {
        let documents = OperationDocuments::find()
            .filter(operation_documents::Column::OperationId.eq(operation_id))
            .order_by_asc(operation_documents::Column::UploadedAt)
            .order_by_asc(operation_documents::Column::Id)
            .all(&self.db)
            .await?;

        if documents.is_empty() {
            debug!(
                operation_id = %operation_id,
                template_id = %template.id,
                "Operation has no documents, leaving template documents untouched"
            );
            return Ok(());
        }

        let stats = match self.strategy {
            DocumentMirrorStrategy::FullReplace => self.replace_all(template.id, &documents).await?,
            DocumentMirrorStrategy::DiffByUrl => self.diff_by_url(template.id, &documents).await?,
        };

        info!(
            operation_id = %operation_id,
            template_id = %template.id,
            strategy = ?self.strategy,
            inserted = stats.inserted,
            updated = stats.updated,
            deleted = stats.deleted,
            "Synced operation documents to template"
        );

        Ok(())
    }

    async fn target_template(
        &self,
        operation_id: Uuid,
        part_id: Uuid,
        operation_name: &str,
    ) -> Result<Option<operation_templates::Model>, SyncError> {
        if let Some(template) = template_resolver::resolve(&self.db, part_id, operation_name).await? {
            return Ok(Some(template));
        }

        let Some(operation) = Operations::find_by_id(operation_id).one(&self.db).await? else {
            warn!(operation_id = %operation_id, "Operation not found, skipping document sync");
            return Ok(None);
        };

        let snapshot = mapper::snapshot_from_operation(&operation);
        let estimated_duration =
            estimated_duration_minutes(snapshot.actual_start_time, snapshot.actual_end_time);
        let fields = mapper::template_fields(operation_name, &snapshot, estimated_duration);

        let template = write_template(&self.db, part_id, fields).await?;
        record_template_link(&self.db, &operation, &template).await?;

        Ok(Some(template))
    }

    async fn replace_all(
        &self,
        template_id: Uuid,
        documents: &[operation_documents::Model],
    ) -> Result<MirrorStats, SyncError> {
        let deleted = TemplateDocuments::delete_many()
            .filter(template_documents::Column::TemplateId.eq(template_id))
            .exec(&self.db)
            .await?;

        let copies: Vec<template_documents::ActiveModel> = documents
            .iter()
            .map(|document| mapper::template_document_copy(document, template_id))
            .collect();
        let inserted = copies.len();

        TemplateDocuments::insert_many(copies)
            .exec_without_returning(&self.db)
            .await?;

        Ok(MirrorStats {
            inserted,
            updated: 0,
            deleted: deleted.rows_affected as usize,
        })
    }

    async fn diff_by_url(
        &self,
        template_id: Uuid,
        documents: &[operation_documents::Model],
    ) -> Result<MirrorStats, SyncError> {
        let existing = TemplateDocuments::find()
            .filter(template_documents::Column::TemplateId.eq(template_id))
            .order_by_asc(template_documents::Column::UploadedAt)
            .order_by_asc(template_documents::Column::Id)
            .all(&self.db)
            .await?;

        let plan = plan_url_diff(&existing, documents);
        let mut stats = MirrorStats::default();

        if !plan.delete.is_empty() {
            let deleted = TemplateDocuments::delete_many()
                .filter(template_documents::Column::Id.is_in(plan.delete.clone()))
                .exec(&self.db)
                .await?;
            stats.deleted = deleted.rows_affected as usize;
        }

        for (current, source) in plan.update {
            let mut active: template_documents::ActiveModel = current.clone().into();
            active.name = Set(source.name.clone());
            active.file_type = Set(source.file_type.clone());
            active.uploaded_at = Set(source.uploaded_at);
            active.size = Set(source.size);
            active.update(&self.db).await?;
            stats.updated += 1;
        }

        if !plan.insert.is_empty() {
            let copies: Vec<template_documents::ActiveModel> = plan
                .insert
                .iter()
                .map(|document| mapper::template_document_copy(document, template_id))
                .collect();
            stats.inserted = copies.len();
            TemplateDocuments::insert_many(copies)
                .exec_without_returning(&self.db)
                .await?;
        }

        Ok(stats)
    }
}

/// Changes that bring a template's documents in line with an operation's, keyed on URL
#[derive(Debug, Default)]
struct UrlDiffPlan<'a> {
    insert: Vec<&'a operation_documents::Model>,
    update: Vec<(&'a template_documents::Model, &'a operation_documents::Model)>,
    delete: Vec<Uuid>,
}

fn plan_url_diff<'a>(
    existing: &'a [template_documents::Model],
    documents: &'a [operation_documents::Model],
) -> UrlDiffPlan<'a> {
    let mut plan = UrlDiffPlan::default();

    // First template row per URL is kept, later duplicates are extra
    let mut by_url: HashMap<&str, &template_documents::Model> = HashMap::new();
    for current in existing {
        if by_url.contains_key(current.url.as_str()) {
            plan.delete.push(current.id);
        } else {
            by_url.insert(current.url.as_str(), current);
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for source in documents {
        if !seen.insert(source.url.as_str()) {
            continue;
        }
        match by_url.get(source.url.as_str()).copied() {
            Some(current) if mapper::document_matches(current, source) => {}
            Some(current) => plan.update.push((current, source)),
            None => plan.insert.push(source),
        }
    }

    for (url, current) in &by_url {
        if !seen.contains(url) {
            plan.delete.push(current.id);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn uploaded() -> sea_orm::prelude::DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap().fixed_offset()
    }

    fn op_doc(name: &str, url: &str) -> operation_documents::Model {
        operation_documents::Model {
            id: Uuid::new_v4(),
            operation_id: Uuid::nil(),
            name: name.to_string(),
            url: url.to_string(),
            file_type: "application/pdf".to_string(),
            uploaded_at: uploaded(),
            size: Some(100),
        }
    }

    fn tpl_doc(name: &str, url: &str) -> template_documents::Model {
        template_documents::Model {
            id: Uuid::new_v4(),
            template_id: Uuid::nil(),
            name: name.to_string(),
            url: url.to_string(),
            file_type: "application/pdf".to_string(),
            uploaded_at: uploaded(),
            size: Some(100),
        }
    }

    #[test]
    fn test_diff_keeps_matching_and_adds_missing() {
        let existing = vec![tpl_doc("a.pdf", "u/a")];
        let documents = vec![op_doc("a.pdf", "u/a"), op_doc("b.pdf", "u/b")];

        let plan = plan_url_diff(&existing, &documents);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
        assert_eq!(plan.insert.len(), 1);
        assert_eq!(plan.insert[0].url, "u/b");
    }

    #[test]
    fn test_diff_removes_extra_and_duplicates() {
        let keep = tpl_doc("a.pdf", "u/a");
        let duplicate = tpl_doc("a-copy.pdf", "u/a");
        let extra = tpl_doc("old.pdf", "u/old");
        let existing = vec![keep.clone(), duplicate.clone(), extra.clone()];
        let documents = vec![op_doc("a.pdf", "u/a")];

        let plan = plan_url_diff(&existing, &documents);
        assert!(plan.insert.is_empty());
        assert!(plan.update.is_empty());
        assert_eq!(plan.delete.len(), 2);
        assert!(plan.delete.contains(&duplicate.id));
        assert!(plan.delete.contains(&extra.id));
        assert!(!plan.delete.contains(&keep.id));
    }

    #[test]
    fn test_diff_updates_changed_metadata() {
        let existing = vec![tpl_doc("a.pdf", "u/a")];
        let documents = vec![op_doc("a-rev2.pdf", "u/a")];

        let plan = plan_url_diff(&existing, &documents);
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].1.name, "a-rev2.pdf");
    }
}
