//! Operation Handlers
//!
//! CRUD over work order operations. Mutations accept `?syncToTemplate=true`
//! to propagate the change into the part's operation template.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::models::document::{Document, NewDocument};
use crate::models::operation::{NewOperation, Operation, OperationUpdate, SyncOptions};
use crate::AppState;

/// Body of POST /api/operations/{id}/sync-template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTemplateRequest {
    #[serde(default = "default_true")]
    pub sync_documents: bool,
}

fn default_true() -> bool {
    true
}

/// GET /api/operations/{id}
pub async fn get_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Operation>, ApiError> {
    let operation = state.operations.get_operation(id).await.map_err(api_error)?;
    Ok(Json(operation))
}

/// GET /api/work-orders/{work_order_id}/operations
pub async fn get_work_order_operations(
    State(state): State<AppState>,
    Path(work_order_id): Path<Uuid>,
) -> Result<Json<Vec<Operation>>, ApiError> {
    let operations = state
        .operations
        .get_operations_by_work_order(work_order_id)
        .await
        .map_err(api_error)?;
    Ok(Json(operations))
}

/// POST /api/work-orders/{work_order_id}/operations
pub async fn create_operation(
    State(state): State<AppState>,
    Path(work_order_id): Path<Uuid>,
    Query(options): Query<SyncOptions>,
    Json(request): Json<NewOperation>,
) -> Result<(StatusCode, Json<Operation>), ApiError> {
    info!(
        work_order_id = %work_order_id,
        sync_to_template = options.sync_to_template,
        "Create operation request received"
    );

    let operation = state
        .operations
        .create_operation(work_order_id, request, options)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(operation)))
}

/// PUT /api/operations/{id}
pub async fn update_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(options): Query<SyncOptions>,
    Json(update): Json<OperationUpdate>,
) -> Result<Json<Operation>, ApiError> {
    info!(
        operation_id = %id,
        sync_to_template = options.sync_to_template,
        "Update operation request received"
    );

    let operation = state
        .operations
        .update_operation(id, update, options)
        .await
        .map_err(api_error)?;
    Ok(Json(operation))
}

/// DELETE /api/operations/{id}
pub async fn delete_operation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.operations.delete_operation(id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/operations/{id}/documents
pub async fn add_operation_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(options): Query<SyncOptions>,
    Json(request): Json<NewDocument>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = state
        .operations
        .add_operation_document(id, request, options)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// DELETE /api/operation-documents/{document_id}
pub async fn remove_operation_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Query(options): Query<SyncOptions>,
) -> Result<StatusCode, ApiError> {
    state
        .operations
        .remove_operation_document(document_id, options)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/operations/{id}/sync-template
///
/// Unlike the sync that follows a mutation, failures here are reported.
pub async fn sync_operation_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<SyncTemplateRequest>>,
) -> Result<Json<Operation>, ApiError> {
    let sync_documents = request.map(|Json(r)| r.sync_documents).unwrap_or(true);

    let operation = state
        .operations
        .sync_operation_now(id, sync_documents)
        .await
        .map_err(api_error)?;
    Ok(Json(operation))
}

/// POST /api/work-orders/{work_order_id}/operations/from-templates
pub async fn populate_from_templates(
    State(state): State<AppState>,
    Path(work_order_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Vec<Operation>>), ApiError> {
    let operations = state
        .operations
        .populate_operations_from_templates(work_order_id)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(operations)))
}
