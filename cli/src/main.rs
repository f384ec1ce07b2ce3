//! permit: operate a governance instance persisted to a state file.

use clap::Parser;
use permit_cli::{execute, CliConfig, Command, Context};
use permit_types::{Clock, SystemClock, Timestamp};
use permit_utils::{init_logging, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "permit", about = "Permissioned network governance", version)]
struct Cli {
    /// Governance state file.
    #[arg(long, global = true, env = "PERMIT_STATE")]
    state: Option<PathBuf>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "PERMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "PERMIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, global = true, env = "PERMIT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Override the current time (Unix seconds).
    #[arg(long, global = true, env = "PERMIT_NOW")]
    now: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    let config = CliConfig {
        state_path: cli.state.unwrap_or(file_config.state_path),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        governance: file_config.governance,
    };

    init_logging(config.log_format, &config.log_level)?;
    if let Some(ref path) = cli.config {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let ctx = Context {
        state_path: config.state_path,
        governance: config.governance,
        now: cli.now.map(Timestamp::new).unwrap_or_else(|| SystemClock.now()),
    };
    for line in execute(&cli.command, &ctx)? {
        println!("{line}");
    }
    Ok(())
}
