//! HTTP handlers over the operation and template services

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ServiceError;
use crate::AppState;

pub mod operations;
pub mod templates;

/// Error body returned by every handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a service failure to a status code and error body
pub fn api_error(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::InvalidRecord(_) | ServiceError::Database(_) | ServiceError::Sync(_) => {
            error!(error = %err, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state
        .db
        .ping()
        .await
        .map_err(|e| api_error(ServiceError::Database(e)))?;
    Ok("ok")
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/operations/{id}",
            get(operations::get_operation)
                .put(operations::update_operation)
                .delete(operations::delete_operation),
        )
        .route(
            "/api/operations/{id}/documents",
            post(operations::add_operation_document),
        )
        .route(
            "/api/operations/{id}/sync-template",
            post(operations::sync_operation_template),
        )
        .route(
            "/api/operation-documents/{document_id}",
            delete(operations::remove_operation_document),
        )
        .route(
            "/api/work-orders/{work_order_id}/operations",
            get(operations::get_work_order_operations).post(operations::create_operation),
        )
        .route(
            "/api/work-orders/{work_order_id}/operations/from-templates",
            post(operations::populate_from_templates),
        )
        .route(
            "/api/parts/{part_id}/operation-templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/api/operation-templates/{id}",
            get(templates::get_template).delete(templates::delete_template),
        )
        .route(
            "/api/operation-templates/{id}/documents",
            post(templates::add_template_document),
        )
        .with_state(state)
}
