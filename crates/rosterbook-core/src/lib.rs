// ABOUTME: Core library for rosterbook, containing the student record and envelope types.
// ABOUTME: This crate defines the shared data model used across all rosterbook components.

pub mod envelope;
pub mod record;

pub use envelope::{EXPORT_VERSION, ExportData, ExportEnvelope};
pub use record::StudentRecord;
