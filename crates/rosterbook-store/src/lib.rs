// ABOUTME: Persistence layer for rosterbook, coordinating a SQLite primary tier and flat mirrors.
// ABOUTME: Provides the RosterStore façade plus envelope export/import and file transfer glue.

pub mod config;
pub mod export;
pub mod flat;
pub mod sqlite;
pub mod store;
pub mod transfer;

pub use config::{ConfigError, StoreConfig};
pub use export::{ExportError, ImportError};
pub use flat::{FlatError, FlatMirror};
pub use sqlite::{PrimaryStore, SqliteError};
pub use store::{RosterStore, STUDENTS_KEY, SaveError, StoreError};
pub use transfer::{SHARE_LINK_MAX_CHARS, TransferError, share_link};
