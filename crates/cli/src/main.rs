//! Sensors - emit analytics events from the command line
//!
//! # Usage
//!
//! ```bash
//! # Track an event through the batch endpoint
//! sensors track user-42 ViewProduct --url https://sa.example.com/sa --properties '{"price": 9.99}'
//!
//! # Validate against the debug endpoint without storing anything
//! sensors track user-42 ViewProduct --url https://sa.example.com/sa --debug --dry-run
//!
//! # Profile updates, consumer taken from a config file
//! sensors --config sensors.toml profile unset user-42 --keys age,city
//!
//! # Inspect a captured data_list payload
//! sensors decode H4sIAAAAAAAA...
//! ```

mod cmd;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use sensors_client::ClientConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sensors - emit analytics events from the command line
#[derive(Parser, Debug)]
#[command(name = "sensors")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (selects the consumer)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track an event
    Track(cmd::track::TrackArgs),

    /// Link an anonymous id to a registered user
    Signup(cmd::track::SignupArgs),

    /// Update or delete a user profile
    Profile(cmd::profile::ProfileArgs),

    /// Decode a data_list payload into JSON
    Decode(cmd::decode::DecodeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Track(args) => {
            init_logging(&resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref()))?;
            cmd::track::run_track(args, cli.config.as_deref())
        }
        Command::Signup(args) => {
            init_logging(&resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref()))?;
            cmd::track::run_signup(args, cli.config.as_deref())
        }
        Command::Profile(args) => {
            init_logging(&resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref()))?;
            cmd::profile::run(args, cli.config.as_deref())
        }
        Command::Decode(args) => {
            // Decode doesn't need logging - just outputs to stdout
            cmd::decode::run(args)
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config_path: Option<&Path>) -> String {
    if let Some(level) = cli_level {
        return level.to_string();
    }

    if let Some(path) = config_path
        && path.exists()
        && let Ok(config) = ClientConfig::from_file(path)
    {
        return config.log.level.as_str().to_string();
    }

    "info".to_string()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}
