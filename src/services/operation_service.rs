//! Operation service
//!
//! Stable API over operations and their documents. Every mutation persists
//! the primary row first; template sync runs afterwards only when the caller
//! asks for it, and its failures are logged, never returned.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{SyncMode, SyncSettings};
use crate::entities::{
    operation_documents, operation_templates, operations,
    prelude::{OperationDocuments, OperationTemplates, Operations, TemplateDocuments, WorkOrders},
    template_documents,
};
use crate::error::ServiceError;
use crate::models::document::{Document, NewDocument};
use crate::models::mapper;
use crate::models::operation::{NewOperation, Operation, OperationUpdate, SyncOptions};
use crate::services::template_sync::TemplateSyncService;

/// Sync work scheduled after a successful primary write
#[derive(Debug, Clone, Copy)]
enum FollowUp {
    /// Fields and (optionally) documents
    Template { operation_id: Uuid, options: SyncOptions },
    /// Documents only
    Documents { operation_id: Uuid, create_missing: bool },
}

#[derive(Clone)]
pub struct OperationService {
    db: DatabaseConnection,
    sync: TemplateSyncService,
    mode: SyncMode,
}

impl OperationService {
    pub fn new(db: DatabaseConnection, settings: SyncSettings) -> Self {
        let sync = TemplateSyncService::new(db.clone(), settings.document_strategy);
        Self {
            db,
            sync,
            mode: settings.mode,
        }
    }

    /// Get one operation with its documents
    pub async fn get_operation(&self, id: Uuid) -> Result<Operation, ServiceError> {
        let model = Operations::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation {}", id)))?;

        let documents = OperationDocuments::find()
            .filter(operation_documents::Column::OperationId.eq(id))
            .order_by_asc(operation_documents::Column::UploadedAt)
            .order_by_asc(operation_documents::Column::Id)
            .all(&self.db)
            .await?;

        mapper::operation_from_model(model, documents).map_err(ServiceError::InvalidRecord)
    }

    /// All operations of a work order in sequence order
    pub async fn get_operations_by_work_order(
        &self,
        work_order_id: Uuid,
    ) -> Result<Vec<Operation>, ServiceError> {
        let models = Operations::find()
            .filter(operations::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(operations::Column::Sequence)
            .order_by_asc(operations::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut documents_by_operation: HashMap<Uuid, Vec<operation_documents::Model>> =
            HashMap::new();
        for document in OperationDocuments::find()
            .filter(operation_documents::Column::OperationId.is_in(ids))
            .order_by_asc(operation_documents::Column::UploadedAt)
            .order_by_asc(operation_documents::Column::Id)
            .all(&self.db)
            .await?
        {
            documents_by_operation
                .entry(document.operation_id)
                .or_default()
                .push(document);
        }

        models
            .into_iter()
            .map(|model| {
                let documents = documents_by_operation.remove(&model.id).unwrap_or_default();
                mapper::operation_from_model(model, documents).map_err(ServiceError::InvalidRecord)
            })
            .collect()
    }

    /// Create an operation on a work order
    pub async fn create_operation(
        &self,
        work_order_id: Uuid,
        request: NewOperation,
        options: SyncOptions,
    ) -> Result<Operation, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("operation name must not be empty".to_string()));
        }

        WorkOrders::find_by_id(work_order_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {}", work_order_id)))?;

        let id = Uuid::new_v4();
        mapper::new_operation(id, work_order_id, request, mapper::timestamp_now())
            .insert(&self.db)
            .await?;

        info!(operation_id = %id, work_order_id = %work_order_id, "Created operation");

        if options.sync_to_template {
            self.follow_up(FollowUp::Template { operation_id: id, options })
                .await;
        }

        self.get_operation(id).await
    }

    /// Apply a partial update to an operation
    pub async fn update_operation(
        &self,
        id: Uuid,
        update: OperationUpdate,
        options: SyncOptions,
    ) -> Result<Operation, ServiceError> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ServiceError::InvalidInput("operation name must not be empty".to_string()));
        }

        let model = Operations::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation {}", id)))?;

        let mut active: operations::ActiveModel = model.into();
        if mapper::apply_operation_update(&mut active, update) {
            active.updated_at = Set(mapper::timestamp_now());
            active.update(&self.db).await?;
            info!(operation_id = %id, "Updated operation");
        }

        if options.sync_to_template {
            self.follow_up(FollowUp::Template { operation_id: id, options })
                .await;
        }

        self.get_operation(id).await
    }

    /// Delete an operation and its documents.
    ///
    /// Document deletion is best-effort; the operation row is deleted even if
    /// it fails (rows left behind are removed by the cascade).
    pub async fn delete_operation(&self, id: Uuid) -> Result<(), ServiceError> {
        Operations::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation {}", id)))?;

        match OperationDocuments::delete_many()
            .filter(operation_documents::Column::OperationId.eq(id))
            .exec(&self.db)
            .await
        {
            Ok(result) => {
                info!(operation_id = %id, deleted = result.rows_affected, "Deleted operation documents")
            }
            Err(e) => {
                warn!(operation_id = %id, error = %e, "Failed to delete operation documents, deleting operation anyway")
            }
        }

        Operations::delete_by_id(id).exec(&self.db).await?;
        info!(operation_id = %id, "Deleted operation");
        Ok(())
    }

    /// Attach a document to an operation
    pub async fn add_operation_document(
        &self,
        operation_id: Uuid,
        request: NewDocument,
        options: SyncOptions,
    ) -> Result<Document, ServiceError> {
        Operations::find_by_id(operation_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation {}", operation_id)))?;

        let document = mapper::new_operation_document(operation_id, request, mapper::timestamp_now())
            .insert(&self.db)
            .await?;

        info!(operation_id = %operation_id, document_id = %document.id, "Added operation document");

        if options.sync_to_template {
            self.follow_up(FollowUp::Documents {
                operation_id,
                create_missing: true,
            })
            .await;
        }

        Ok(document.into())
    }

    /// Detach a document from its operation
    pub async fn remove_operation_document(
        &self,
        document_id: Uuid,
        options: SyncOptions,
    ) -> Result<(), ServiceError> {
        let document = OperationDocuments::find_by_id(document_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation document {}", document_id)))?;

        OperationDocuments::delete_by_id(document_id)
            .exec(&self.db)
            .await?;

        info!(
            operation_id = %document.operation_id,
            document_id = %document_id,
            "Removed operation document"
        );

        if options.sync_to_template {
            self.follow_up(FollowUp::Documents {
                operation_id: document.operation_id,
                create_missing: false,
            })
            .await;
        }

        Ok(())
    }

    /// Run a template sync now and report its outcome to the caller
    pub async fn sync_operation_now(
        &self,
        id: Uuid,
        sync_documents: bool,
    ) -> Result<Operation, ServiceError> {
        Operations::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation {}", id)))?;

        let options = SyncOptions {
            sync_to_template: true,
            sync_documents,
        };
        self.sync.sync_operation_to_template(id, None, options).await?;

        self.get_operation(id).await
    }

    /// Create one operation per template of the work order's part.
    ///
    /// Template documents are copied onto each new operation. Templates the
    /// work order already has an operation for are skipped, so repeated calls
    /// add only templates created since. A work order without a part gets
    /// nothing.
    pub async fn populate_operations_from_templates(
        &self,
        work_order_id: Uuid,
    ) -> Result<Vec<Operation>, ServiceError> {
        let work_order = WorkOrders::find_by_id(work_order_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Work order {}", work_order_id)))?;

        let Some(part_id) = work_order.part_id else {
            warn!(work_order_id = %work_order_id, "Work order has no part, no templates to apply");
            return Ok(Vec::new());
        };

        let templates = OperationTemplates::find()
            .filter(operation_templates::Column::PartId.eq(part_id))
            .order_by_asc(operation_templates::Column::Sequence)
            .order_by_asc(operation_templates::Column::Name)
            .all(&self.db)
            .await?;

        let applied: HashSet<Uuid> = Operations::find()
            .filter(operations::Column::WorkOrderId.eq(work_order_id))
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|operation| operation.template_id)
            .collect();

        let now = mapper::timestamp_now();
        let mut created = 0;
        for template in templates.iter().filter(|t| !applied.contains(&t.id)) {
            let operation_id = Uuid::new_v4();
            mapper::operation_from_template(operation_id, work_order_id, template, now)
                .insert(&self.db)
                .await?;

            let copies: Vec<operation_documents::ActiveModel> = TemplateDocuments::find()
                .filter(template_documents::Column::TemplateId.eq(template.id))
                .order_by_asc(template_documents::Column::UploadedAt)
                .order_by_asc(template_documents::Column::Id)
                .all(&self.db)
                .await?
                .iter()
                .map(|document| mapper::operation_document_copy(document, operation_id))
                .collect();

            if !copies.is_empty() {
                OperationDocuments::insert_many(copies)
                    .exec_without_returning(&self.db)
                    .await?;
            }
            created += 1;
        }

        info!(
            work_order_id = %work_order_id,
            part_id = %part_id,
            created,
            skipped = templates.len() - created,
            "Populated operations from templates"
        );

        self.get_operations_by_work_order(work_order_id).await
    }

    async fn follow_up(&self, task: FollowUp) {
        match self.mode {
            SyncMode::Inline => run_follow_up(&self.sync, task).await,
            SyncMode::Background => {
                let sync = self.sync.clone();
                tokio::spawn(async move {
                    run_follow_up(&sync, task).await;
                });
            }
        }
    }
}

async fn run_follow_up(sync: &TemplateSyncService, task: FollowUp) {
    let result = match task {
        FollowUp::Template { operation_id, options } => {
            sync.sync_operation_to_template(operation_id, None, options).await
        }
        FollowUp::Documents {
            operation_id,
            create_missing,
        } => sync.sync_documents_for_operation(operation_id, create_missing).await,
    };

    if let Err(e) = result {
        error!(task = ?task, error = %e, "Template sync failed, primary change was kept");
    }
}
