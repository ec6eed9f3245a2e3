// ABOUTME: Flat key-to-JSON-string tier: durable per-key files plus a session-scoped map.
// ABOUTME: Write-through serializes once and feeds both sub-tiers; reads prefer durable.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur during flat-tier operations.
#[derive(Debug, Error)]
pub enum FlatError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable sub-tier: one JSON file per key, written atomically
/// (temp file, fsync, rename).
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: PathBuf) -> Result<Self, FlatError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn put_raw(&self, key: &str, raw: &str) -> Result<(), FlatError> {
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        let final_path = self.key_path(key);

        let mut file = File::create(&tmp_path)?;
        file.write_all(raw.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, FlatError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session sub-tier: a process-lifetime key-value map. Contents vanish when
/// the process exits, mirroring session-scoped browser storage.
#[derive(Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn put_raw(&self, key: &str, raw: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Both flat sub-tiers behind one surface. The `students` key is mirrored to
/// both; auxiliary keys stay durable-only.
pub struct FlatMirror {
    durable: FileStore,
    session: SessionStore,
}

impl FlatMirror {
    pub fn new(dir: PathBuf) -> Result<Self, FlatError> {
        Ok(Self {
            durable: FileStore::new(dir)?,
            session: SessionStore::default(),
        })
    }

    /// Serialize once and write both sub-tiers. The writes are independent
    /// and best-effort: a durable-tier failure does not block the session
    /// write, but the first error is still reported.
    pub fn write_through<T: Serialize>(&self, key: &str, value: &T) -> Result<(), FlatError> {
        let raw = serde_json::to_string(value)?;
        let durable_result = self.durable.put_raw(key, &raw);
        self.session.put_raw(key, &raw);
        durable_result
    }

    /// Write to the durable sub-tier only.
    pub fn write_durable<T: Serialize>(&self, key: &str, value: &T) -> Result<(), FlatError> {
        let raw = serde_json::to_string(value)?;
        self.durable.put_raw(key, &raw)
    }

    /// Read and parse from the durable sub-tier. Ok(None) when the key is
    /// absent; a parse failure is an error to the caller, never swallowed.
    pub fn read_durable<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FlatError> {
        match self.durable.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read and parse from the session sub-tier.
    pub fn read_session<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FlatError> {
        match self.session.get_raw(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read durable first, falling back to session. Ok(None) when both miss.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FlatError> {
        if let Some(value) = self.read_durable(key)? {
            return Ok(Some(value));
        }
        self.read_session(key)
    }
}
