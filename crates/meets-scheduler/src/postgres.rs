//! PostgreSQL meet store — the production backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection};

use meets_core::{DatabaseConfig, MeetsError, Result};

use crate::lifecycle::{Dialect, Phase};
use crate::status::MeetStatus;
use crate::store::MeetStore;

/// A single PostgreSQL connection, opened per pass.
pub struct PgMeetStore {
    conn: Option<PgConnection>,
}

/// Build connection options from config.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name)
        .ssl_mode(if config.ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        })
        .application_name("meet-scheduler")
        .disable_statement_logging();
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    options
}

impl PgMeetStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let conn = PgConnection::connect_with(&connect_options(config))
            .await
            .map_err(|e| MeetsError::Connection(format!("{}: {e}", config.describe())))?;
        Ok(Self { conn: Some(conn) })
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| MeetsError::Connection("store already closed".into()))
    }
}

#[async_trait]
impl MeetStore for PgMeetStore {
    async fn apply(&mut self, phase: Phase, now: DateTime<Utc>) -> Result<u64> {
        let sql = phase.statement(Dialect::Postgres);
        let result = sqlx::query(&sql)
            .bind(now)
            .execute(self.connection()?)
            .await
            .map_err(|e| MeetsError::Statement {
                phase: phase.name().into(),
                message: e.to_string(),
            })?;
        Ok(result.rows_affected())
    }

    async fn status_counts(&mut self) -> Result<Vec<(MeetStatus, u64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT status_id::int4, COUNT(*) FROM meet GROUP BY status_id ORDER BY status_id",
        )
        .fetch_all(self.connection()?)
        .await
        .map_err(|e| MeetsError::Statement {
            phase: "status_counts".into(),
            message: e.to_string(),
        })?;

        let mut counts = Vec::with_capacity(rows.len());
        for (code, count) in rows {
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
                .await
                .map_err(|e| MeetsError::Connection(format!("DB close error: {e}")))?;
        }
        Ok(())
    }
}
