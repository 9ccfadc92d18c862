//! Operation → template sync orchestrator
//!
//! Propagates an operation's fields (and, unless disabled, its documents) into
//! the matching template of the work order's part, creating the template on
//! first sync.
//!
//! Sync is best-effort. A missing work order, part link or operation is logged
//! and treated as nothing to sync. Template writes and the document mirror are
//! separate statements: a mirror failure after a successful template write is
//! logged and swallowed, leaving the template documents stale.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::DocumentMirrorStrategy;
use crate::entities::{
    operation_templates, operations,
    prelude::{OperationTemplates, Operations, WorkOrders},
};
use crate::error::SyncError;
use crate::models::mapper;
use crate::models::operation::{OperationSnapshot, SyncOptions};
use crate::models::template::TemplateFields;
use crate::services::document_mirror::DocumentMirror;
use crate::services::template_resolver;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Estimated duration in whole minutes from actual start/end.
///
/// Halves round up (towards positive infinity). `None` unless both
/// timestamps are present, and `None` when the minutes overflow the column.
pub fn estimated_duration_minutes(
    actual_start: Option<DateTime<Utc>>,
    actual_end: Option<DateTime<Utc>>,
) -> Option<i32> {
    let (start, end) = (actual_start?, actual_end?);
    let elapsed_ms = (end - start).num_milliseconds() as f64;
    let minutes = (elapsed_ms / MILLIS_PER_MINUTE + 0.5).floor() as i64;
    i32::try_from(minutes).ok()
}

/// Sync orchestrator service
#[derive(Clone)]
pub struct TemplateSyncService {
    db: DatabaseConnection,
    mirror: DocumentMirror,
}

impl TemplateSyncService {
    pub fn new(db: DatabaseConnection, document_strategy: DocumentMirrorStrategy) -> Self {
        let mirror = DocumentMirror::new(db.clone(), document_strategy);
        Self { db, mirror }
    }

    pub fn mirror(&self) -> &DocumentMirror {
        &self.mirror
    }

    /// Sync an operation into the template of its work order's part.
    ///
    /// `operation_data` may carry the already-written field values; otherwise
    /// the current row is used.
    pub async fn sync_operation_to_template(
        &self,
        operation_id: Uuid,
        operation_data: Option<OperationSnapshot>,
        options: SyncOptions,
    ) -> Result<(), SyncError> {
        let Some(operation) = Operations::find_by_id(operation_id).one(&self.db).await? else {
            warn!(operation_id = %operation_id, "Operation not found, skipping template sync");
            return Ok(());
        };

        let Some(work_order) = WorkOrders::find_by_id(operation.work_order_id)
            .one(&self.db)
            .await?
        else {
            warn!(
                operation_id = %operation_id,
                work_order_id = %operation.work_order_id,
                "Work order not found, skipping template sync"
            );
            return Ok(());
        };

        let Some(part_id) = work_order.part_id else {
            warn!(
                operation_id = %operation_id,
                work_order_id = %work_order.id,
                "Work order has no part, skipping template sync"
            );
            return Ok(());
        };

        let operation_name = operation_data
            .as_ref()
            .map(|data| data.name.clone())
            .unwrap_or_else(|| operation.name.clone());

        self.sync_with_row(
            operation_id,
            part_id,
            &operation_name,
            operation_data,
            Some(operation),
            options,
        )
        .await
    }

    /// Sync an operation into the template `(part_id, operation_name)`
    pub async fn sync_operation_to_part_template(
        &self,
        operation_id: Uuid,
        part_id: Uuid,
        operation_name: &str,
        operation_data: Option<OperationSnapshot>,
        options: SyncOptions,
    ) -> Result<(), SyncError> {
        let operation = Operations::find_by_id(operation_id).one(&self.db).await?;
        self.sync_with_row(
            operation_id,
            part_id,
            operation_name,
            operation_data,
            operation,
            options,
        )
        .await
    }

    /// Mirror an operation's documents into its part template.
    ///
    /// With `create_missing` false the template must already exist; otherwise
    /// it is created from the operation row first.
    pub async fn sync_documents_for_operation(
        &self,
        operation_id: Uuid,
        create_missing: bool,
    ) -> Result<(), SyncError> {
        let Some(operation) = Operations::find_by_id(operation_id).one(&self.db).await? else {
            warn!(operation_id = %operation_id, "Operation not found, skipping document sync");
            return Ok(());
        };

        let part_id = WorkOrders::find_by_id(operation.work_order_id)
            .one(&self.db)
            .await?
            .and_then(|work_order| work_order.part_id);
        let Some(part_id) = part_id else {
            warn!(operation_id = %operation_id, "No part linked to operation's work order, skipping document sync");
            return Ok(());
        };

        if create_missing {
            return self
                .mirror
                .sync_operation_documents(operation_id, part_id, &operation.name)
                .await;
        }

        match template_resolver::resolve(&self.db, part_id, &operation.name).await? {
            Some(template) => self.mirror.mirror_into(operation_id, &template).await,
            None => {
                warn!(
                    operation_id = %operation_id,
                    part_id = %part_id,
                    operation_name = %operation.name,
                    "No template for operation, skipping document sync"
                );
                Ok(())
            }
        }
    }

    async fn sync_with_row(
        &self,
        operation_id: Uuid,
        part_id: Uuid,
        operation_name: &str,
        operation_data: Option<OperationSnapshot>,
        operation: Option<operations::Model>,
        options: SyncOptions,
    ) -> Result<(), SyncError> {
        let snapshot = match (operation_data, &operation) {
            (Some(data), _) => data,
            (None, Some(row)) => mapper::snapshot_from_operation(row),
            (None, None) => {
                warn!(operation_id = %operation_id, "Operation not found, skipping template sync");
                return Ok(());
            }
        };

        let estimated_duration =
            estimated_duration_minutes(snapshot.actual_start_time, snapshot.actual_end_time);
        let fields = mapper::template_fields(operation_name, &snapshot, estimated_duration);
        let template = write_template(&self.db, part_id, fields).await?;
        if let Some(row) = &operation {
            record_template_link(&self.db, row, &template).await?;
        }

        info!(
            operation_id = %operation_id,
            template_id = %template.id,
            part_id = %part_id,
            "Synced operation to template"
        );

        if !options.sync_documents {
            debug!(operation_id = %operation_id, "Document sync disabled for this call");
            return Ok(());
        }

        if let Err(e) = self
            .mirror
            .sync_operation_documents(operation_id, part_id, operation_name)
            .await
        {
            error!(
                operation_id = %operation_id,
                template_id = %template.id,
                error = %e,
                "Template document sync failed, template fields were updated"
            );
        }

        Ok(())
    }
}

/// Update the template `(part_id, fields.name)`, or create it.
///
/// An operation whose name has no template gets a new one, even when it was
/// synced under another name before.
pub(crate) async fn write_template<C: ConnectionTrait>(
    db: &C,
    part_id: Uuid,
    fields: TemplateFields,
) -> Result<operation_templates::Model, SyncError> {
    match template_resolver::resolve(db, part_id, &fields.name).await? {
        Some(existing) => update_template(db, existing, fields).await,
        None => insert_template(db, part_id, fields).await,
    }
}

/// Insert-if-absent on (part_id, name). When a concurrent sync won the
/// insert, its row is updated instead.
async fn insert_template<C: ConnectionTrait>(
    db: &C,
    part_id: Uuid,
    fields: TemplateFields,
) -> Result<operation_templates::Model, SyncError> {
    let template_id = Uuid::new_v4();
    let name = fields.name.clone();
    let inserted = OperationTemplates::insert(mapper::new_template(
        template_id,
        part_id,
        fields.clone(),
        mapper::timestamp_now(),
    ))
    .on_conflict(
        OnConflict::columns([
            operation_templates::Column::PartId,
            operation_templates::Column::Name,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    if inserted == 0 {
        debug!(part_id = %part_id, name = %name, "Template created concurrently, updating it");
        let winner = template_resolver::resolve(db, part_id, &name)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("operation template {}", name)))?;
        return update_template(db, winner, fields).await;
    }

    info!(template_id = %template_id, part_id = %part_id, name = %name, "Created operation template");

    let created = OperationTemplates::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("operation template {}", template_id)))?;
    Ok(created)
}

async fn update_template<C: ConnectionTrait>(
    db: &C,
    existing: operation_templates::Model,
    fields: TemplateFields,
) -> Result<operation_templates::Model, SyncError> {
    if fields.matches(&existing) {
        debug!(template_id = %existing.id, "Template already up to date");
        return Ok(existing);
    }

    let mut active: operation_templates::ActiveModel = existing.into();
    mapper::apply_template_fields(&mut active, fields, mapper::timestamp_now());
    Ok(active.update(db).await?)
}

/// Record the template an operation was last synced into
pub(crate) async fn record_template_link<C: ConnectionTrait>(
    db: &C,
    operation: &operations::Model,
    template: &operation_templates::Model,
) -> Result<(), SyncError> {
    if operation.template_id == Some(template.id) {
        return Ok(());
    }

    Operations::update_many()
        .col_expr(operations::Column::TemplateId, Expr::value(template.id))
        .filter(operations::Column::Id.eq(operation.id))
        .exec(db)
        .await?;

    Ok(())
}
