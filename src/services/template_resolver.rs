//! Template resolver
//!
//! Finds the part template an operation syncs into. Templates are addressed
//! by the natural key (part_id, name) with an exact, case-sensitive match.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{operation_templates, prelude::OperationTemplates};
use crate::error::SyncError;

/// Look up the template for `(part_id, operation_name)`.
///
/// When several rows share the key the oldest one wins.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    part_id: Uuid,
    operation_name: &str,
) -> Result<Option<operation_templates::Model>, SyncError> {
    let template = OperationTemplates::find()
        .filter(operation_templates::Column::PartId.eq(part_id))
        .filter(operation_templates::Column::Name.eq(operation_name))
        .order_by_asc(operation_templates::Column::CreatedAt)
        .order_by_asc(operation_templates::Column::Id)
        .one(db)
        .await?;

    debug!(
        part_id = %part_id,
        operation_name = operation_name,
        found = template.is_some(),
        "Resolved template by natural key"
    );

    Ok(template)
}
