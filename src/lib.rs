// src/lib.rs

use config::SyncSettings;
use sea_orm::DatabaseConnection;
use services::{operation_service::OperationService, template_service::TemplateService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub operations: OperationService,
    pub templates: TemplateService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, sync: SyncSettings) -> Self {
        Self {
            operations: OperationService::new(db.clone(), sync),
            templates: TemplateService::new(db.clone()),
            db,
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod operation_documents;
    pub mod operation_templates;
    pub mod operations;
    pub mod parts;
    pub mod template_documents;
    pub mod work_orders;
}

pub mod services {
    pub mod template_resolver;
    pub mod template_sync;
    pub mod document_mirror;
    pub mod operation_service;
    pub mod template_service;
}

pub mod config;
pub mod error;
pub mod models;
pub mod handlers;
