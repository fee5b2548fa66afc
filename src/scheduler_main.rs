//! # AdventureMeets Meet Scheduler
//!
//! Moves meets through their lifecycle (Published → Open → Closed → Completed)
//! based on opening/closing dates, waitlist fullness, and end times.
//!
//! Usage:
//!   meet-scheduler                       # One pass, print JSON summary, exit
//!   meet-scheduler watch --every 300     # Pass every 5 minutes until Ctrl-C
//!   meet-scheduler stats                 # Meets per lifecycle state
//!   meet-scheduler --sqlite ./meets.db   # Local SQLite store instead of PostgreSQL
//!
//! Connection parameters come from the config file and `DB_HOST`, `DB_PORT`,
//! `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSL`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use meets_core::{DatabaseBackend, WorkerConfig};
use meets_scheduler::{LifecycleScheduler, spawn_scheduler};

#[derive(Parser)]
#[command(
    name = "meet-scheduler",
    version,
    about = "🏔️ AdventureMeets — meet lifecycle scheduler"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ~/.adventuremeets/scheduler.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Use a local SQLite database file instead of PostgreSQL
    #[arg(long, global = true)]
    sqlite: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scheduler pass and exit (default)
    Run,
    /// Run a pass on a fixed interval until Ctrl-C
    Watch {
        /// Seconds between passes (default: scheduler.interval_secs)
        #[arg(long)]
        every: Option<u64>,
    },
    /// Print the number of meets in each lifecycle state
    Stats,
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        "meet_scheduler=debug,meets_scheduler=debug,meets_core=debug"
    } else {
        "meet_scheduler=info,meets_scheduler=info,meets_core=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<WorkerConfig> {
    let mut config = match &cli.config {
        Some(path) => WorkerConfig::load_from(Path::new(&*shellexpand::tilde(path)))?,
        None => WorkerConfig::load()?,
    };
    config.apply_env()?;
    if let Some(path) = &cli.sqlite {
        config.database.backend = DatabaseBackend::Sqlite;
        config.database.path = path.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!("Store: {}", config.database.describe());
    let scheduler = LifecycleScheduler::new(config.database.clone());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let summary = scheduler.run_scheduler_pass().await?;
            let json = serde_json::to_string(&summary)?;
            tracing::info!("✅ Scheduler pass complete: {json}");
            println!("{json}");
        }
        Command::Watch { every } => {
            let interval = every.unwrap_or(config.scheduler.interval_secs);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("⚠️ Failed to listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            spawn_scheduler(scheduler, interval, shutdown).await;
        }
        Command::Stats => {
            let counts = scheduler.status_counts().await?;
            let report: serde_json::Map<String, serde_json::Value> = counts
                .into_iter()
                .map(|(status, n)| (status.to_string(), serde_json::json!(n)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("❌ Meet scheduler failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::try_parse_from(["meet-scheduler"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_watch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "meet-scheduler",
            "watch",
            "--every",
            "60",
            "--sqlite",
            "/tmp/meets.db",
            "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Watch { every: Some(60) })));
        assert_eq!(cli.sqlite.as_deref(), Some("/tmp/meets.db"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_sqlite_flag_overrides_backend() {
        let dir = std::env::temp_dir().join(format!("meets-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("scheduler.toml");
        std::fs::write(&config_path, "[scheduler]\ninterval_secs = 42\n").unwrap();

        let cli = Cli::try_parse_from([
            "meet-scheduler",
            "--config",
            config_path.to_str().unwrap(),
            "--sqlite",
            "/tmp/local.db",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.path, "/tmp/local.db");
        assert_eq!(config.scheduler.interval_secs, 42);
        std::fs::remove_dir_all(&dir).ok();
    }
}
