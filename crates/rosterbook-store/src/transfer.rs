// ABOUTME: File-based backup/restore of the export envelope, plus share-link encoding.
// ABOUTME: Export filenames embed the calendar date; restore accepts the same JSON shape.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rosterbook_core::StudentRecord;
use rosterbook_core::envelope::ExportEnvelope;
use thiserror::Error;

use crate::export::{ExportError, ImportError};
use crate::store::RosterStore;

/// Serialized record arrays longer than this are refused for link sharing.
pub const SHARE_LINK_MAX_CHARS: usize = 50_000;

/// Errors that can occur moving envelopes to and from files.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("envelope json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),
}

impl RosterStore {
    /// Write the full export envelope to
    /// `<dir>/student-records-YYYY-MM-DD.json`, pretty-printed and written
    /// atomically. Returns the path of the written file.
    pub fn export_to_file(&self, dir: &Path) -> Result<PathBuf, TransferError> {
        let envelope = self.export_all()?;
        fs::create_dir_all(dir)?;

        let name = format!("student-records-{}.json", Utc::now().format("%Y-%m-%d"));
        let final_path = dir.join(&name);
        let tmp_path = dir.join(format!("{name}.tmp"));

        let json = serde_json::to_string_pretty(&envelope)?;
        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;
        Ok(final_path)
    }

    /// Restore a dataset from an export file produced by `export_to_file`,
    /// or any JSON document with the same shape. A document without a `data`
    /// member fails here, before anything is written.
    pub fn import_from_file(&self, path: &Path) -> Result<(), TransferError> {
        let contents = fs::read_to_string(path)?;
        let envelope: ExportEnvelope = serde_json::from_str(&contents)?;
        self.import_all(&envelope)?;
        Ok(())
    }
}

/// Encode a raw record array into a shareable URL. The payload is the bare
/// JSON array, percent-encoded into the fragment; no envelope wrapping.
/// Returns None when the serialized array exceeds [`SHARE_LINK_MAX_CHARS`],
/// rather than producing a truncated link.
pub fn share_link(base_url: &str, records: &[StudentRecord]) -> Option<String> {
    let json = serde_json::to_string(records).ok()?;
    if json.len() > SHARE_LINK_MAX_CHARS {
        tracing::warn!(
            "record set too large to share as a link ({} chars)",
            json.len()
        );
        return None;
    }
    Some(format!("{base_url}#data={}", urlencoding::encode(&json)))
}
