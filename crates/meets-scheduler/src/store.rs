//! Store abstraction — what the scheduler needs from the relational database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use meets_core::{DatabaseBackend, DatabaseConfig, Result};

use crate::lifecycle::Phase;
use crate::postgres::PgMeetStore;
use crate::sqlite::SqliteMeetStore;
use crate::status::MeetStatus;

/// A connection to the meet store, held for the duration of one pass.
#[async_trait]
pub trait MeetStore: Send {
    /// Run the bulk statement for `phase` at instant `now`. Returns rows transitioned.
    async fn apply(&mut self, phase: Phase, now: DateTime<Utc>) -> Result<u64>;

    /// Number of meets per lifecycle state. States with no meets are omitted.
    async fn status_counts(&mut self) -> Result<Vec<(MeetStatus, u64)>>;

    /// Release the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// Open a store for the configured backend.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn MeetStore>> {
    tracing::debug!("Connecting to {}", config.describe());
    match config.backend {
        DatabaseBackend::Postgres => Ok(Box::new(PgMeetStore::connect(config).await?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteMeetStore::open(&config.sqlite_path())?)),
    }
}
