//! # AdventureMeets Core
//!
//! Configuration and error types shared by the AdventureMeets background
//! workers.

pub mod config;
pub mod error;

pub use config::{DatabaseBackend, DatabaseConfig, SchedulerConfig, WorkerConfig};
pub use error::{MeetsError, Result};
