//! Operation template models for the part library

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Document;
use crate::entities::operation_templates;

/// A part-scoped operation template with its documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationTemplate {
    pub id: Uuid,
    pub part_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub machining_methods: Option<String>,
    pub setup_instructions: Option<String>,
    pub sequence: i32,
    /// Minutes
    pub estimated_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub documents: Vec<Document>,
}

/// Request to create a template directly from the part library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub machining_methods: Option<String>,
    pub setup_instructions: Option<String>,
    #[serde(default)]
    pub sequence: i32,
    pub estimated_duration: Option<i32>,
}

/// The template columns written by a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFields {
    pub name: String,
    pub description: Option<String>,
    pub machining_methods: Option<String>,
    pub setup_instructions: Option<String>,
    pub sequence: i32,
    pub estimated_duration: Option<i32>,
}

impl TemplateFields {
    /// True when the stored row already holds these values
    pub fn matches(&self, model: &operation_templates::Model) -> bool {
        self.name == model.name
            && self.description == model.description
            && self.machining_methods == model.machining_methods
            && self.setup_instructions == model.setup_instructions
            && self.sequence == model.sequence
            && self.estimated_duration == model.estimated_duration
    }
}

impl From<NewTemplate> for TemplateFields {
    fn from(request: NewTemplate) -> Self {
        Self {
            name: request.name,
            description: request.description,
            machining_methods: request.machining_methods,
            setup_instructions: request.setup_instructions,
            sequence: request.sequence,
            estimated_duration: request.estimated_duration,
        }
    }
}
