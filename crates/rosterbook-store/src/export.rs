// ABOUTME: Whole-dataset export and import through the versioned envelope.
// ABOUTME: Auxiliary blobs live under fixed durable flat keys and pass through verbatim.

use rosterbook_core::envelope::{EXPORT_VERSION, ExportData, ExportEnvelope};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::flat::FlatError;
use crate::store::{RosterStore, SaveError};

pub const BLOCKED_STUDENTS_KEY: &str = "blockedStudents";
pub const DEPARTMENTS_KEY: &str = "departments";
pub const CUSTOM_SUBJECTS_KEY: &str = "customSubjects";
pub const REQUIRED_SUBJECT_SETTINGS_KEY: &str = "requiredSubjectSettings";

/// Errors that can occur assembling an export. Unlike `load_records`, a
/// malformed auxiliary blob here propagates to the caller instead of
/// degrading the result.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("auxiliary flat read failed: {0}")]
    Flat(#[from] FlatError),
}

/// Errors that can occur applying an imported envelope.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("record save failed: {0}")]
    Save(#[from] SaveError),

    #[error("auxiliary flat write failed: {0}")]
    Flat(#[from] FlatError),
}

impl RosterStore {
    /// Assemble the full dataset into an export envelope: the record set via
    /// the load fallback chain, plus the four auxiliary blobs from the
    /// durable flat tier (defaulting to empty when absent).
    pub fn export_all(&self) -> Result<ExportEnvelope, ExportError> {
        let students = self.load_records();

        Ok(ExportEnvelope::new(ExportData {
            students: Some(students),
            blocked_students: Some(self.aux_or(BLOCKED_STUDENTS_KEY, Value::Array(Vec::new()))?),
            departments: Some(self.aux_or(DEPARTMENTS_KEY, Value::Array(Vec::new()))?),
            custom_subjects: Some(self.aux_or(CUSTOM_SUBJECTS_KEY, Value::Object(Map::new()))?),
            required_subject_settings: Some(
                self.aux_or(REQUIRED_SUBJECT_SETTINGS_KEY, Value::Object(Map::new()))?,
            ),
        }))
    }

    fn aux_or(&self, key: &str, default: Value) -> Result<Value, ExportError> {
        Ok(self.mirror.read_durable::<Value>(key)?.unwrap_or(default))
    }

    /// Restore a dataset from an envelope. `data.students`, when present,
    /// fully replaces the current record set; each auxiliary blob present
    /// and non-null overwrites its durable flat key verbatim, with no shape
    /// validation. A version mismatch is accepted with a warning.
    pub fn import_all(&self, envelope: &ExportEnvelope) -> Result<(), ImportError> {
        if envelope.version != EXPORT_VERSION {
            tracing::warn!(
                "importing envelope version '{}' (current is '{}')",
                envelope.version,
                EXPORT_VERSION
            );
        }

        if let Some(students) = &envelope.data.students {
            self.save_records(students)?;
        }

        let aux = [
            (BLOCKED_STUDENTS_KEY, &envelope.data.blocked_students),
            (DEPARTMENTS_KEY, &envelope.data.departments),
            (CUSTOM_SUBJECTS_KEY, &envelope.data.custom_subjects),
            (
                REQUIRED_SUBJECT_SETTINGS_KEY,
                &envelope.data.required_subject_settings,
            ),
        ];
        for (key, blob) in aux {
            if let Some(blob) = blob
                && !blob.is_null()
            {
                self.mirror.write_durable(key, blob)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterbook_core::StudentRecord;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn record(value: Value) -> StudentRecord {
        serde_json::from_value(value).unwrap()
    }

    fn open_store(dir: &TempDir) -> RosterStore {
        RosterStore::open(dir.path().join("home")).unwrap()
    }

    #[test]
    fn export_of_empty_store_defaults_every_field() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let envelope = store.export_all().unwrap();

        assert_eq!(envelope.version, EXPORT_VERSION);
        assert_eq!(envelope.data.students.as_deref(), Some(&[][..]));
        assert_eq!(envelope.data.blocked_students, Some(json!([])));
        assert_eq!(envelope.data.departments, Some(json!([])));
        assert_eq!(envelope.data.custom_subjects, Some(json!({})));
        assert_eq!(envelope.data.required_subject_settings, Some(json!({})));
    }

    #[test]
    fn export_then_import_leaves_dataset_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let records = vec![
            record(json!({ "id": "s-1", "department": "Math" })),
            record(json!({ "id": "s-2", "semester": "2" })),
        ];
        store.save_records(&records).unwrap();
        store
            .mirror
            .write_durable(BLOCKED_STUDENTS_KEY, &json!([{ "studentId": "s-9" }]))
            .unwrap();
        store
            .mirror
            .write_durable(DEPARTMENTS_KEY, &json!(["Math", "Physics"]))
            .unwrap();
        store
            .mirror
            .write_durable(CUSTOM_SUBJECTS_KEY, &json!({ "Math": ["Algebra"] }))
            .unwrap();
        store
            .mirror
            .write_durable(REQUIRED_SUBJECT_SETTINGS_KEY, &json!({ "minCredits": 12 }))
            .unwrap();

        let envelope = store.export_all().unwrap();
        store.import_all(&envelope).unwrap();

        let reloaded = store.load_records();
        assert_eq!(reloaded.len(), 2);

        let after = store.export_all().unwrap();
        assert_eq!(after.data.blocked_students, envelope.data.blocked_students);
        assert_eq!(after.data.departments, envelope.data.departments);
        assert_eq!(after.data.custom_subjects, envelope.data.custom_subjects);
        assert_eq!(
            after.data.required_subject_settings,
            envelope.data.required_subject_settings
        );
    }

    #[test]
    fn import_replaces_record_set_and_aux_blobs() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .save_records(&[record(json!({ "id": "old" }))])
            .unwrap();
        store
            .mirror
            .write_durable(DEPARTMENTS_KEY, &json!(["Old"]))
            .unwrap();

        let envelope: ExportEnvelope = serde_json::from_value(json!({
            "version": "1.0",
            "data": {
                "students": [{ "id": "new" }],
                "departments": ["New"]
            }
        }))
        .unwrap();
        store.import_all(&envelope).unwrap();

        let loaded = store.load_records();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), Some("new"));

        let departments: Option<Value> = store.mirror.read_durable(DEPARTMENTS_KEY).unwrap();
        assert_eq!(departments, Some(json!(["New"])));
    }

    #[test]
    fn import_without_students_leaves_records_alone() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .save_records(&[record(json!({ "id": "kept" }))])
            .unwrap();

        let envelope: ExportEnvelope = serde_json::from_value(json!({
            "data": { "departments": ["Only aux"] }
        }))
        .unwrap();
        store.import_all(&envelope).unwrap();

        let loaded = store.load_records();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id(), Some("kept"));
    }

    #[test]
    fn null_aux_blob_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .mirror
            .write_durable(CUSTOM_SUBJECTS_KEY, &json!({ "kept": true }))
            .unwrap();

        let envelope: ExportEnvelope = serde_json::from_value(json!({
            "data": { "customSubjects": null }
        }))
        .unwrap();
        store.import_all(&envelope).unwrap();

        let subjects: Option<Value> = store.mirror.read_durable(CUSTOM_SUBJECTS_KEY).unwrap();
        assert_eq!(subjects, Some(json!({ "kept": true })));
    }

    #[test]
    fn malformed_aux_blob_fails_the_export() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let flat_dir = dir.path().join("home").join("flat");
        fs::write(flat_dir.join("blockedStudents.json"), "broken{").unwrap();

        let result = store.export_all();
        assert!(matches!(result, Err(ExportError::Flat(FlatError::Json(_)))));
    }
}
