// ABOUTME: SQLite-backed primary tier holding students, blocked entries, and settings.
// ABOUTME: Provides transactional full-replace of the student set and indexed lookups.

use std::path::Path;

use rosterbook_core::StudentRecord;
use rusqlite::{Connection, params};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during primary-tier operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record has no string `id` field")]
    MissingId,
}

/// The transactional primary tier. Students are keyed by `id` with
/// non-unique indexes on `department` and `semester`; blocked entries and
/// settings live in their own keyed tables.
pub struct PrimaryStore {
    conn: Connection,
}

impl PrimaryStore {
    /// Open or create the database at the given path and run the schema.
    pub fn open(path: &Path) -> Result<Self, SqliteError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                department TEXT,
                semester TEXT,
                body TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_students_department ON students(department);
            CREATE INDEX IF NOT EXISTS idx_students_semester ON students(semester);

            CREATE TABLE IF NOT EXISTS blocked_students (
                student_id TEXT PRIMARY KEY,
                body TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        Ok(Self { conn })
    }

    /// Replace the full student set inside one transaction: delete every row,
    /// then insert each record. A record without a string `id`, or any
    /// rejected insert, rolls the whole replace back and leaves the prior
    /// contents intact.
    pub fn replace_students(&mut self, records: &[StudentRecord]) -> Result<(), SqliteError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM students", [])?;

        for record in records {
            let id = record.id().ok_or(SqliteError::MissingId)?;
            let body = serde_json::to_string(record)?;
            tx.execute(
                "INSERT INTO students (id, department, semester, body) VALUES (?1, ?2, ?3, ?4)",
                params![id, record.department(), record.semester(), body],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load every student record, body JSON parsed back verbatim.
    pub fn load_students(&self) -> Result<Vec<StudentRecord>, SqliteError> {
        let mut stmt = self.conn.prepare("SELECT body FROM students")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Students in one department, via the secondary index.
    pub fn students_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<StudentRecord>, SqliteError> {
        self.students_where("department", department)
    }

    /// Students in one semester, via the secondary index.
    pub fn students_by_semester(&self, semester: &str) -> Result<Vec<StudentRecord>, SqliteError> {
        self.students_where("semester", semester)
    }

    fn students_where(&self, column: &str, value: &str) -> Result<Vec<StudentRecord>, SqliteError> {
        // column is one of two fixed names, never caller input
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT body FROM students WHERE {column} = ?1"))?;
        let rows = stmt.query_map(params![value], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Upsert a blocked-student entry keyed by student id.
    pub fn put_blocked(&self, student_id: &str, body: &Value) -> Result<(), SqliteError> {
        self.conn.execute(
            "INSERT INTO blocked_students (student_id, body) VALUES (?1, ?2)
             ON CONFLICT(student_id) DO UPDATE SET body = excluded.body",
            params![student_id, serde_json::to_string(body)?],
        )?;
        Ok(())
    }

    /// List all blocked-student entries.
    pub fn list_blocked(&self) -> Result<Vec<Value>, SqliteError> {
        let mut stmt = self.conn.prepare("SELECT body FROM blocked_students")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(serde_json::from_str(&row?)?);
        }
        Ok(entries)
    }

    /// Upsert a setting value by key.
    pub fn put_setting(&self, key: &str, value: &Value) -> Result<(), SqliteError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    /// Read a setting value by key, None if unset.
    pub fn get_setting(&self, key: &str) -> Result<Option<Value>, SqliteError> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;

        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SqliteError::Sqlite(e)),
        }
    }
}
