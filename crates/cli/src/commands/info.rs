//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration information for display
#[derive(Serialize)]
struct ConfigInfo {
    config_path: String,
    version: String,
    producer: ProducerInfo,
    adapter: AdapterInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ProducerInfo {
    shard_count: u32,
    completion_delay_ms: u64,
    fail_streams: Vec<String>,
}

#[derive(Serialize)]
struct AdapterInfo {
    stream: Option<String>,
    partition_key: Option<String>,
    explicit_hash_key: Option<String>,
    sync: bool,
    send_timeout_ms: Option<i64>,
    output_sink: Option<String>,
    failure_sink: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    kind: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let config_info = ConfigInfo {
        config_path: args.config.display().to_string(),
        version: format!("{:?}", blueprint.version),
        producer: ProducerInfo {
            shard_count: blueprint.producer.shard_count,
            completion_delay_ms: blueprint.producer.completion_delay_ms,
            fail_streams: blueprint.producer.fail_streams.clone(),
        },
        adapter: AdapterInfo {
            stream: blueprint.adapter.stream.clone(),
            partition_key: blueprint.adapter.partition_key.clone(),
            explicit_hash_key: blueprint.adapter.explicit_hash_key.clone(),
            sync: blueprint.adapter.sync,
            send_timeout_ms: blueprint.adapter.send_timeout_ms,
            output_sink: blueprint.adapter.output_sink.clone(),
            failure_sink: blueprint.adapter.failure_sink.clone(),
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                kind: format!("{:?}", s.kind),
                queue_capacity: s.queue_capacity,
            })
            .collect(),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&config_info).context("Failed to serialize info")?
        );
    } else {
        print_info(&config_info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("Configuration: {}", info.config_path);
    println!("Version: {}", info.version);

    println!("\nProducer:");
    println!("  Shards: {}", info.producer.shard_count);
    println!(
        "  Completion delay: {}ms",
        info.producer.completion_delay_ms
    );
    if !info.producer.fail_streams.is_empty() {
        println!("  Failing streams: {:?}", info.producer.fail_streams);
    }

    println!("\nAdapter:");
    println!(
        "  Stream: {}",
        info.adapter.stream.as_deref().unwrap_or("<headers>")
    );
    println!(
        "  Partition key: {}",
        info.adapter.partition_key.as_deref().unwrap_or("<headers>")
    );
    if let Some(ref key) = info.adapter.explicit_hash_key {
        println!("  Explicit hash key: {}", key);
    }
    println!("  Sync: {}", info.adapter.sync);
    if let Some(timeout) = info.adapter.send_timeout_ms {
        println!("  Send timeout: {}ms", timeout);
    }
    if let Some(ref sink) = info.adapter.output_sink {
        println!("  Output sink: {}", sink);
    }
    if let Some(ref sink) = info.adapter.failure_sink {
        println!("  Failure sink: {}", sink);
    }

    if !info.sinks.is_empty() {
        println!("\nSinks ({}):", info.sinks.len());
        for sink in &info.sinks {
            println!(
                "  - {} ({}, capacity {})",
                sink.name, sink.kind, sink.queue_capacity
            );
        }
    }
}
