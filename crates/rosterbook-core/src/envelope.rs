// ABOUTME: The versioned export envelope wrapping the full rosterbook dataset.
// ABOUTME: Serializes with camelCase keys so exported files match the published format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::StudentRecord;

/// Version string stamped into every export. Importers accept other
/// versions (logging a warning), so bumping this does not break restores.
pub const EXPORT_VERSION: &str = "1.0";

/// The document written by a full export and accepted by a full import.
/// `data` is the only structurally required part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    pub data: ExportData,
}

fn default_version() -> String {
    EXPORT_VERSION.to_string()
}

/// The dataset payload: the student set plus four auxiliary blobs that pass
/// through unvalidated. Absent fields import as no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default)]
    pub students: Option<Vec<StudentRecord>>,
    #[serde(default)]
    pub blocked_students: Option<Value>,
    #[serde(default)]
    pub departments: Option<Value>,
    #[serde(default)]
    pub custom_subjects: Option<Value>,
    #[serde(default)]
    pub required_subject_settings: Option<Value>,
}

impl ExportEnvelope {
    /// Wrap a payload with the current version and timestamp.
    pub fn new(data: ExportData) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: Some(Utc::now()),
            data,
        }
    }
}
