//! File references attached to operations and templates
//!
//! Only the reference is stored here; the blob itself lives in object storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document attached to an operation or a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// MIME type
    #[serde(rename = "type")]
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Request to attach a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
    /// Defaults to now
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size: Option<i64>,
}
