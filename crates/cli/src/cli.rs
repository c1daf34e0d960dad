//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stream-relay - Outbound put-record adapter for stream ingestion
#[derive(Parser, Debug)]
#[command(
    name = "stream-relay",
    author,
    version,
    about = "Outbound put-record adapter for stream ingestion",
    long_about = "Maps pipeline messages onto put-record requests, dispatches them \n\
                  asynchronously to a stream-ingestion producer, and routes each \n\
                  outcome back as an enriched success message or a failure envelope."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STREAM_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STREAM_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay against the in-memory loopback producer
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "relay.toml", env = "STREAM_RELAY_CONFIG")]
    pub config: PathBuf,

    /// Number of records to generate and send
    #[arg(long, default_value = "100", env = "STREAM_RELAY_COUNT")]
    pub count: u64,

    /// Override the destination stream from configuration
    #[arg(long, env = "STREAM_RELAY_STREAM")]
    pub stream: Option<String>,

    /// Distinct partition keys to rotate through
    #[arg(long, default_value = "8", env = "STREAM_RELAY_PARTITIONS")]
    pub partitions: u32,

    /// Grace period to wait for in-flight dispatches, in seconds
    #[arg(long, default_value = "5", env = "STREAM_RELAY_DRAIN_TIMEOUT")]
    pub drain_timeout: u64,

    /// Validate configuration and exit without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "STREAM_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
