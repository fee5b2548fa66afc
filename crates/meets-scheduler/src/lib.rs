//! # AdventureMeets Scheduler
//!
//! Periodic, stateless batch job that moves meets through their lifecycle
//! based on dates and waitlist fullness.
//!
//! ## Design Principles
//! - Set-based: one bulk `UPDATE` per phase, never per-meet iteration
//! - Idempotent: a second pass with no elapsed time changes nothing
//! - Stateless: each pass opens and releases its own store connection
//! - Overlap-safe: every predicate is re-checked inside its own statement
//!
//! ## Architecture
//! ```text
//! LifecycleScheduler::run_scheduler_pass()
//!   ├── 1. open              Published → Open       (opening_date <= now)
//!   ├── 2. close_by_date     Open → Closed          (closing_date <= now)
//!   ├── 3. close_by_waitlist Open → Closed          (waitlisted >= waitlist_size)
//!   └── 4. archive           Published/Open/Closed → Completed (end_time <= now)
//!
//! MeetStore
//!   ├── PgMeetStore      (sqlx, production)
//!   └── SqliteMeetStore  (rusqlite, local + tests)
//! ```

pub mod engine;
pub mod lifecycle;
pub mod postgres;
pub mod sqlite;
pub mod status;
pub mod store;

pub use engine::{LifecycleScheduler, PassSummary, run_pass_on, spawn_scheduler};
pub use lifecycle::{Dialect, Phase};
pub use postgres::PgMeetStore;
pub use sqlite::SqliteMeetStore;
pub use status::{AttendeeStatus, Meet, MeetStatus};
pub use store::{MeetStore, connect};
