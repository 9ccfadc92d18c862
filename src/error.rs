//! Error types for the operation and template services

use sea_orm::DbErr;
use thiserror::Error;

/// Failure inside template synchronization.
///
/// Missing work orders, parts or templates are not errors: the sync logs a
/// warning and returns `Ok(())`. Only store failures surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Template sync infrastructure error: {0}")]
    Infrastructure(#[from] DbErr),
}

/// Failure of a primary operation/template mutation or query
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    Sync(#[from] SyncError),
}
