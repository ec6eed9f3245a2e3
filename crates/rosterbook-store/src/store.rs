// ABOUTME: Persistence façade coordinating the SQLite primary tier and the flat mirror.
// ABOUTME: Saves write through every tier; loads walk a strict fallback chain with read-repair.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use rosterbook_core::StudentRecord;
use thiserror::Error;

use crate::flat::{FlatError, FlatMirror};
use crate::sqlite::{PrimaryStore, SqliteError};

/// Flat-tier key under which the full record set is mirrored.
pub const STUDENTS_KEY: &str = "students";

/// Errors that can occur opening the store's directory layout.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("flat tier error: {0}")]
    Flat(#[from] FlatError),
}

/// A failed save. The flat backstop write still ran (and a defensive retry
/// was attempted), so the durable flat tier usually holds the records even
/// when this is returned; only the primary tier is in doubt.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("flat tier write failed: {0}")]
    Flat(#[from] FlatError),

    #[error("primary tier write failed: {0}")]
    Primary(#[from] SqliteError),
}

/// The single entry point for record persistence. Owns the flat mirror and a
/// lazily opened primary-tier handle; when the primary tier cannot be opened
/// it is treated as unavailable for the rest of the session and every
/// operation degrades to the flat tier.
pub struct RosterStore {
    home: PathBuf,
    db_path: PathBuf,
    pub(crate) mirror: FlatMirror,
    primary: OnceLock<Option<Mutex<PrimaryStore>>>,
}

impl RosterStore {
    /// Open a store rooted at `home`, creating the directory layout
    /// (`flat/` for the durable flat tier, `roster.db` for the primary tier).
    /// The primary database itself is not opened until first use.
    pub fn open(home: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&home)?;
        let mirror = FlatMirror::new(home.join("flat"))?;
        let db_path = home.join("roster.db");

        Ok(Self {
            home,
            db_path,
            mirror,
            primary: OnceLock::new(),
        })
    }

    /// Return the home directory path.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Lazily open the primary tier. The OnceLock makes first use
    /// single-flight: concurrent callers can never open duplicate
    /// connections. An open failure is logged once and pins the tier as
    /// unavailable for the rest of this store's lifetime.
    pub(crate) fn primary(&self) -> Option<&Mutex<PrimaryStore>> {
        self.primary
            .get_or_init(|| match PrimaryStore::open(&self.db_path) {
                Ok(store) => Some(Mutex::new(store)),
                Err(e) => {
                    tracing::warn!("primary tier unavailable for this session: {e}");
                    None
                }
            })
            .as_ref()
    }

    /// Persist the full record set, replacing whatever was stored before.
    ///
    /// The flat mirror is written first as the durability backstop, then the
    /// primary tier performs a transactional full replace. An unavailable
    /// primary tier is still a success ("committed to at least the flat
    /// tier"). A primary-path failure re-asserts the flat write defensively
    /// and reports the error; the records then live in the flat tier only.
    pub fn save_records(&self, records: &[StudentRecord]) -> Result<(), SaveError> {
        if let Err(e) = self.mirror.write_through(STUDENTS_KEY, &records) {
            tracing::error!("flat tier write failed: {e}");
            // Last-resort attempt before reporting failure.
            if let Err(retry) = self.mirror.write_through(STUDENTS_KEY, &records) {
                tracing::error!("flat tier retry also failed: {retry}");
            }
            return Err(e.into());
        }

        let Some(primary) = self.primary() else {
            tracing::warn!("primary tier unavailable, committed to flat tier only");
            return Ok(());
        };

        let mut primary = primary.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = primary.replace_students(records) {
            tracing::error!("primary tier replace failed: {e}");
            drop(primary);
            if let Err(retry) = self.mirror.write_through(STUDENTS_KEY, &records) {
                tracing::error!("defensive flat tier write failed: {retry}");
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Load the full record set through the fallback chain:
    /// primary tier (read-repairing the durable flat tier when non-empty),
    /// then durable flat, then session flat, then empty. An explicit empty
    /// array in a flat tier is a valid terminal result. Read and parse
    /// failures are logged and fall through; this never returns an error.
    pub fn load_records(&self) -> Vec<StudentRecord> {
        if let Some(primary) = self.primary() {
            let primary = primary.lock().unwrap_or_else(PoisonError::into_inner);
            match primary.load_students() {
                Ok(records) if !records.is_empty() => {
                    drop(primary);
                    if let Err(e) = self.mirror.write_durable(STUDENTS_KEY, &records) {
                        tracing::warn!("read-repair of durable flat tier failed: {e}");
                    }
                    return records;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("primary tier read failed: {e}"),
            }
        }

        match self.mirror.read_durable::<Vec<StudentRecord>>(STUDENTS_KEY) {
            Ok(Some(records)) => return records,
            Ok(None) => {}
            Err(e) => tracing::warn!("durable flat tier unreadable under '{STUDENTS_KEY}': {e}"),
        }

        match self.mirror.read_session::<Vec<StudentRecord>>(STUDENTS_KEY) {
            Ok(Some(records)) => return records,
            Ok(None) => {}
            Err(e) => tracing::warn!("session flat tier unreadable under '{STUDENTS_KEY}': {e}"),
        }

        Vec::new()
    }
}
