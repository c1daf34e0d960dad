//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{DriverConfig, RelayDriver};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref stream) = args.stream {
        info!(stream = %stream, "Overriding destination stream from CLI");
        blueprint.adapter.stream = Some(stream.clone());
    }

    if blueprint.adapter.stream.is_none() {
        anyhow::bail!(
            "configuration has no adapter.stream and no --stream override; \
             the generated messages carry no stream header"
        );
    }

    info!(
        stream = blueprint.adapter.stream.as_deref().unwrap_or_default(),
        sync = blueprint.adapter.sync,
        shard_count = blueprint.producer.shard_count,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let driver = RelayDriver::new(DriverConfig {
        blueprint,
        count: args.count,
        partitions: args.partitions,
        drain_timeout: Duration::from_secs(args.drain_timeout),
    });

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting relay run...");

    tokio::select! {
        result = driver.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        submitted = stats.dispatch.submitted,
                        succeeded = stats.dispatch.succeeded,
                        failed = stats.dispatch.failed,
                        duration_secs = stats.duration.as_secs_f64(),
                        throughput = format!("{:.2}", stats.sends_per_sec()),
                        "Relay run completed"
                    );

                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Relay run failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping relay...");
        }
    }

    info!("stream-relay finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Producer:");
    println!("  Shards: {}", blueprint.producer.shard_count);
    println!(
        "  Completion delay: {}ms",
        blueprint.producer.completion_delay_ms
    );
    if !blueprint.producer.fail_streams.is_empty() {
        println!("  Failing streams: {:?}", blueprint.producer.fail_streams);
    }

    println!("\nAdapter:");
    println!(
        "  Stream: {}",
        blueprint.adapter.stream.as_deref().unwrap_or("<headers>")
    );
    println!(
        "  Partition key: {}",
        blueprint
            .adapter
            .partition_key
            .as_deref()
            .unwrap_or("<headers>")
    );
    println!("  Sync: {}", blueprint.adapter.sync);
    if let Some(timeout) = blueprint.adapter.send_timeout_ms {
        println!("  Send timeout: {}ms", timeout);
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.kind);
        }
    }

    println!();
}
