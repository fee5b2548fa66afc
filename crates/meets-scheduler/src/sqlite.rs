//! SQLite-backed meet store — local runs and the test suite.
//! Same four statements as PostgreSQL; bootstraps its own tables.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use meets_core::{MeetsError, Result};

use crate::lifecycle::{Dialect, Phase};
use crate::status::{AttendeeStatus, Meet, MeetStatus};
use crate::store::MeetStore;

/// SQLite connection scoped to one scheduler pass.
pub struct SqliteMeetStore {
    conn: Option<Connection>,
}

/// Fixed-width UTC text, so string comparison in SQL is chronological.
fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SqliteMeetStore {
    /// Open or create the database. Use `:memory:` for a throwaway store.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| MeetsError::Connection(format!("DB open error: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| MeetsError::Connection(format!("DB open error: {e}")))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| MeetsError::Connection(format!("DB pragma error: {e}")))?;

        let store = Self { conn: Some(conn) };
        store.migrate()?;
        Ok(store)
    }

    /// Create the tables the scheduler reads, if missing.
    fn migrate(&self) -> Result<()> {
        self.connection()?
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS meet (
                id TEXT PRIMARY KEY,
                status_id INTEGER NOT NULL DEFAULT 1,
                opening_date TEXT,
                closing_date TEXT,
                end_time TEXT,
                waitlist_size INTEGER,
                updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS attendee (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meet_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                FOREIGN KEY (meet_id) REFERENCES meet(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_attendee_meet_status ON attendee(meet_id, status);
         ",
            )
            .map_err(|e| MeetsError::Connection(format!("Migration: {e}")))
    }

    pub(crate) fn connection(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| MeetsError::Connection("store already closed".into()))
    }

    /// Insert or replace a meet row.
    pub fn save_meet(&self, meet: &Meet) -> Result<()> {
        self.connection()?
            .execute(
                "INSERT OR REPLACE INTO meet
                 (id, status_id, opening_date, closing_date, end_time, waitlist_size, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    meet.id,
                    meet.status.code(),
                    meet.opening_date.map(ts),
                    meet.closing_date.map(ts),
                    meet.end_time.map(ts),
                    meet.waitlist_size,
                    ts(Utc::now()),
                ],
            )
            .map_err(|e| MeetsError::Statement {
                phase: "save_meet".into(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Add `count` attendees with `status` to a meet.
    pub fn add_attendees(&self, meet_id: &str, status: AttendeeStatus, count: usize) -> Result<()> {
        let conn = self.connection()?;
        for _ in 0..count {
            conn.execute(
                "INSERT INTO attendee (meet_id, status) VALUES (?1, ?2)",
                params![meet_id, status.as_str()],
            )
            .map_err(|e| MeetsError::Statement {
                phase: "add_attendees".into(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Current status of a meet, `None` if it doesn't exist.
    pub fn meet_status(&self, id: &str) -> Result<Option<MeetStatus>> {
        let code: Option<i32> = self
            .connection()?
            .query_row("SELECT status_id FROM meet WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(|e| MeetsError::Statement {
                phase: "meet_status".into(),
                message: e.to_string(),
            })?;
        Ok(code.and_then(MeetStatus::from_code))
    }

    /// `updated_at` of a meet as stored.
    pub fn updated_at(&self, id: &str) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<Option<String>> = self
            .connection()?
            .query_row("SELECT updated_at FROM meet WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(|e| MeetsError::Statement {
                phase: "updated_at".into(),
                message: e.to_string(),
            })?;
        Ok(raw
            .flatten()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)))
    }
}

#[async_trait]
impl MeetStore for SqliteMeetStore {
    async fn apply(&mut self, phase: Phase, now: DateTime<Utc>) -> Result<u64> {
        let sql = phase.statement(Dialect::Sqlite);
        let changed = self
            .connection()?
            .execute(&sql, params![ts(now)])
            .map_err(|e| MeetsError::Statement {
                phase: phase.name().into(),
                message: e.to_string(),
            })?;
        Ok(changed as u64)
    }

    async fn status_counts(&mut self) -> Result<Vec<(MeetStatus, u64)>> {
        let conn = self.connection()?;
        let to_err = |e: rusqlite::Error| MeetsError::Statement {
            phase: "status_counts".into(),
            message: e.to_string(),
        };
        let mut stmt = conn
            .prepare("SELECT status_id, COUNT(*) FROM meet GROUP BY status_id ORDER BY status_id")
            .map_err(to_err)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)?)))
            .map_err(to_err)?;

        let mut counts = Vec::new();
        for row in rows {
            let (code, count) = row.map_err(to_err)?;
            match MeetStatus::from_code(code) {
                Some(status) => counts.push((status, count as u64)),
                None => tracing::warn!("⚠️ Unknown status_id {code} on {count} meet(s)"),
            }
        }
        Ok(counts)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .map_err(|(_, e)| MeetsError::Connection(format!("DB close error: {e}")))?;
        }
        Ok(())
    }
}
