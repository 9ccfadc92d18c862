//! Part library template service
//!
//! Explicit template management for the part library. Templates created here
//! are the same rows the sync orchestrator resolves by (part_id, name).

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    operation_templates,
    prelude::{OperationTemplates, Parts, TemplateDocuments},
    template_documents,
};
use crate::error::ServiceError;
use crate::models::document::{Document, NewDocument};
use crate::models::mapper;
use crate::models::template::{NewTemplate, OperationTemplate, TemplateFields};
use crate::services::template_resolver;

#[derive(Clone)]
pub struct TemplateService {
    db: DatabaseConnection,
}

impl TemplateService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Templates of a part in sequence order, without documents
    pub async fn list_templates(&self, part_id: Uuid) -> Result<Vec<OperationTemplate>, ServiceError> {
        let templates = OperationTemplates::find()
            .filter(operation_templates::Column::PartId.eq(part_id))
            .order_by_asc(operation_templates::Column::Sequence)
            .order_by_asc(operation_templates::Column::Name)
            .all(&self.db)
            .await?;

        Ok(templates
            .into_iter()
            .map(|model| mapper::template_from_model(model, Vec::new()))
            .collect())
    }

    /// One template with its documents
    pub async fn get_template(&self, id: Uuid) -> Result<OperationTemplate, ServiceError> {
        let model = OperationTemplates::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation template {}", id)))?;

        let documents = self.template_documents(id).await?;
        Ok(mapper::template_from_model(model, documents))
    }

    pub async fn create_template(
        &self,
        part_id: Uuid,
        request: NewTemplate,
    ) -> Result<OperationTemplate, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("template name must not be empty".to_string()));
        }

        Parts::find_by_id(part_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {}", part_id)))?;

        if template_resolver::resolve(&self.db, part_id, &request.name)
            .await?
            .is_some()
        {
            return Err(ServiceError::InvalidInput(format!(
                "template '{}' already exists for part {}",
                request.name, part_id
            )));
        }

        let fields = TemplateFields::from(request);
        let model = mapper::new_template(Uuid::new_v4(), part_id, fields, mapper::timestamp_now())
            .insert(&self.db)
            .await?;

        info!(template_id = %model.id, part_id = %part_id, name = %model.name, "Created operation template");
        Ok(mapper::template_from_model(model, Vec::new()))
    }

    /// Attach a document directly to a template.
    ///
    /// Under the full-replace mirror strategy it is dropped by the next
    /// document sync from any operation with documents.
    pub async fn add_template_document(
        &self,
        template_id: Uuid,
        request: NewDocument,
    ) -> Result<Document, ServiceError> {
        OperationTemplates::find_by_id(template_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation template {}", template_id)))?;

        let document = mapper::new_template_document(template_id, request, mapper::timestamp_now())
            .insert(&self.db)
            .await?;

        Ok(document.into())
    }

    /// Delete a template, documents first
    pub async fn delete_template(&self, id: Uuid) -> Result<(), ServiceError> {
        OperationTemplates::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operation template {}", id)))?;

        if let Err(e) = TemplateDocuments::delete_many()
            .filter(template_documents::Column::TemplateId.eq(id))
            .exec(&self.db)
            .await
        {
            warn!(template_id = %id, error = %e, "Failed to delete template documents, deleting template anyway");
        }

        OperationTemplates::delete_by_id(id).exec(&self.db).await?;
        info!(template_id = %id, "Deleted operation template");
        Ok(())
    }

    async fn template_documents(
        &self,
        template_id: Uuid,
    ) -> Result<Vec<template_documents::Model>, ServiceError> {
        Ok(TemplateDocuments::find()
            .filter(template_documents::Column::TemplateId.eq(template_id))
            .order_by_asc(template_documents::Column::UploadedAt)
            .order_by_asc(template_documents::Column::Id)
            .all(&self.db)
            .await?)
    }
}
