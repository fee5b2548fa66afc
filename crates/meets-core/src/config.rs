//! AdventureMeets worker configuration.
//!
//! Layering: TOML file (or defaults) → `DB_*` environment variables → CLI flags
//! (applied by the binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{MeetsError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl WorkerConfig {
    /// Load config from the default path (~/.adventuremeets/scheduler.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MeetsError::Config(format!("Failed to read config: {e}")))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MeetsError::Config(format!("Failed to parse config: {e}")))
    }

    /// Overlay `DB_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.database.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("scheduler.toml")
    }

    /// Get the AdventureMeets home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".adventuremeets")
    }
}

/// Which relational store the scheduler talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl FromStr for DatabaseBackend {
    type Err = MeetsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(MeetsError::Config(format!("Unknown database backend: {other}"))),
        }
    }
}

/// Store connection parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_name")]
    pub name: String,
    /// Require TLS for the PostgreSQL connection.
    #[serde(default)]
    pub ssl: bool,
    /// SQLite database file (backend = "sqlite").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_host() -> String { "localhost".into() }
fn default_port() -> u16 { 5432 }
fn default_user() -> String { "postgres".into() }
fn default_name() -> String { "adventuremeets".into() }
fn default_path() -> String { "~/.adventuremeets/meets.db".into() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            name: default_name(),
            ssl: false,
            path: default_path(),
        }
    }
}

// Password stays out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("name", &self.name)
            .field("ssl", &self.ssl)
            .field("path", &self.path)
            .finish()
    }
}

impl DatabaseConfig {
    /// Overlay `DB_BACKEND`, `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_NAME`, `DB_SSL` and `DB_PATH` from `lookup`. Unset keys keep their value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DB_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = lookup("DB_HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            self.port = v
                .trim()
                .parse()
                .map_err(|e| MeetsError::Config(format!("Invalid DB_PORT '{v}': {e}")))?;
        }
        if let Some(v) = lookup("DB_USER") {
            self.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = lookup("DB_NAME") {
            self.name = v;
        }
        if let Some(v) = lookup("DB_SSL") {
            self.ssl = parse_flag(&v)
                .ok_or_else(|| MeetsError::Config(format!("Invalid DB_SSL '{v}'")))?;
        }
        if let Some(v) = lookup("DB_PATH") {
            self.path = v;
        }
        Ok(())
    }

    /// SQLite path with `~` expanded.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }

    /// Human-readable target for logs (no password).
    pub fn describe(&self) -> String {
        match self.backend {
            DatabaseBackend::Postgres => format!(
                "postgres://{}@{}:{}/{}{}",
                self.user,
                self.host,
                self.port,
                self.name,
                if self.ssl { " (tls)" } else { "" }
            ),
            DatabaseBackend::Sqlite => format!("sqlite://{}", self.sqlite_path().display()),
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "require" => Some(true),
        "" | "0" | "false" | "no" | "off" | "disable" => Some(false),
        _ => None,
    }
}

/// Scheduler timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between passes in watch mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 { 300 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}
