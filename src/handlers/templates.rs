//! Operation Template Handlers
//!
//! Part library endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::models::document::{Document, NewDocument};
use crate::models::template::{NewTemplate, OperationTemplate};
use crate::AppState;

/// GET /api/parts/{part_id}/operation-templates
pub async fn list_templates(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
) -> Result<Json<Vec<OperationTemplate>>, ApiError> {
    let templates = state
        .templates
        .list_templates(part_id)
        .await
        .map_err(api_error)?;
    Ok(Json(templates))
}

/// POST /api/parts/{part_id}/operation-templates
pub async fn create_template(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
    Json(request): Json<NewTemplate>,
) -> Result<(StatusCode, Json<OperationTemplate>), ApiError> {
    let template = state
        .templates
        .create_template(part_id, request)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/operation-templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OperationTemplate>, ApiError> {
    let template = state.templates.get_template(id).await.map_err(api_error)?;
    Ok(Json(template))
}

/// DELETE /api/operation-templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.templates.delete_template(id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/operation-templates/{id}/documents
pub async fn add_template_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NewDocument>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = state
        .templates
        .add_template_document(id, request)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(document)))
}
