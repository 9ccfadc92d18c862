//! Operation types and status enum for work order steps
//!
//! Status progresses: Not Started → In Progress → QC → Complete

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::document::Document;

/// Operation status values, persisted as their display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "QC")]
    Qc,
    #[serde(rename = "Complete")]
    Complete,
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::NotStarted => write!(f, "Not Started"),
            OperationStatus::InProgress => write!(f, "In Progress"),
            OperationStatus::Qc => write!(f, "QC"),
            OperationStatus::Complete => write!(f, "Complete"),
        }
    }
}

impl std::str::FromStr for OperationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(OperationStatus::NotStarted),
            "In Progress" => Ok(OperationStatus::InProgress),
            "QC" => Ok(OperationStatus::Qc),
            "Complete" => Ok(OperationStatus::Complete),
            _ => Err(format!("Unknown operation status: {}", s)),
        }
    }
}

/// An operation with its documents, as returned by the service layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub work_order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub status: OperationStatus,
    pub machining_methods: Option<String>,
    pub setup_instructions: Option<String>,
    pub sequence: i32,
    pub is_custom: bool,
    pub estimated_start_time: Option<DateTime<Utc>>,
    pub estimated_end_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub comments: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub documents: Vec<Document>,
}

/// Request to create an operation on a work order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOperation {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
    pub machining_methods: Option<String>,
    pub setup_instructions: Option<String>,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub is_custom: bool,
    pub estimated_start_time: Option<DateTime<Utc>>,
    pub estimated_end_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub comments: Option<String>,
    pub assigned_to: Option<Uuid>,
}

/// Partial update of an operation.
///
/// Absent fields are left untouched. For nullable columns an explicit `null`
/// clears the value (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<OperationStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub machining_methods: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub setup_instructions: Option<Option<String>>,
    pub sequence: Option<i32>,
    pub is_custom: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_start_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_end_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_start_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_end_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub comments: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Distinguishes an explicit `null` from a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The operation fields that feed a template sync, keyed by persisted column name.
///
/// Callers that already hold the freshly written row pass it as a snapshot so
/// the sync does not need to re-read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub machining_methods: Option<String>,
    #[serde(default)]
    pub setup_instructions: Option<String>,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub actual_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_end_time: Option<DateTime<Utc>>,
}

/// Options recognised by mutating calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOptions {
    /// Run any template synchronization at all
    pub sync_to_template: bool,
    /// Mirror documents as part of a template sync
    pub sync_documents: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_to_template: false,
            sync_documents: true,
        }
    }
}

impl SyncOptions {
    /// Options for a mutation that should propagate into the template library
    pub fn with_sync() -> Self {
        Self {
            sync_to_template: true,
            ..Self::default()
        }
    }

    pub fn without_documents(mut self) -> Self {
        self.sync_documents = false;
        self
    }
}
