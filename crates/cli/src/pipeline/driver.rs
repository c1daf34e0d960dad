//! Relay driver
//!
//! Wires the adapter to the loopback producer and the configured sinks,
//! feeds generated messages through it, and collects run statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{header_names, Message, RelayBlueprint, SinkKind, SinkResolver};
use observability::DispatchStatsAggregator;
use outbound::{ChannelSink, DispatchError, DispatchHandle, LogSink, PutAdapter, SinkRegistry};
use producer::LoopbackProducer;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::stats::RunStats;

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Loaded blueprint
    pub blueprint: RelayBlueprint,

    /// Number of records to send
    pub count: u64,

    /// Distinct partition keys to rotate through
    pub partitions: u32,

    /// Grace period for in-flight dispatches
    pub drain_timeout: Duration,
}

struct SinkDrain {
    name: String,
    received: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

/// Drives one relay run
pub struct RelayDriver {
    config: DriverConfig,
}

impl RelayDriver {
    /// Create a driver from configuration
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Run the relay and collect statistics
    pub async fn run(self) -> Result<RunStats> {
        let blueprint = &self.config.blueprint;

        let producer = Arc::new(LoopbackProducer::from_settings(&blueprint.producer));
        let (registry, drains) = build_sinks(blueprint);
        let adapter = build_adapter(blueprint, Arc::clone(&producer), &registry)
            .context("Failed to build adapter from blueprint")?;

        info!(
            count = self.config.count,
            partitions = self.config.partitions,
            sync = blueprint.adapter.sync,
            sinks = blueprint.sinks.len(),
            "Relay run starting"
        );

        let start = Instant::now();
        let mut dispatch_stats = DispatchStatsAggregator::new();
        let mut in_flight: Vec<(Instant, DispatchHandle)> = Vec::new();

        for i in 0..self.config.count {
            let message = generate_message(i, self.config.partitions);
            let stream = blueprint.adapter.stream.as_deref().unwrap_or("default");
            dispatch_stats.record_submitted(stream, payload_size(&message));
            observability::record_dispatch_submitted(stream, 1, payload_size(&message));

            if blueprint.adapter.sync {
                let sent_at = Instant::now();
                match adapter.send(message).await {
                    Ok(_) => {
                        dispatch_stats
                            .record_completed(true, sent_at.elapsed().as_secs_f64() * 1000.0);
                        observability::record_dispatch_completed(stream, true);
                    }
                    Err(DispatchError::SendTimeout { .. }) => {
                        dispatch_stats.record_timed_out();
                        observability::record_send_timeout(stream);
                    }
                    Err(DispatchError::Configuration { .. } | DispatchError::Conversion { .. }) => {
                        dispatch_stats.record_build_error();
                    }
                    Err(e) => {
                        debug!(error = %e, "Synchronous send failed");
                        dispatch_stats
                            .record_completed(false, sent_at.elapsed().as_secs_f64() * 1000.0);
                        observability::record_dispatch_completed(stream, false);
                    }
                }
            } else {
                match adapter.dispatch(message) {
                    Ok(handle) => in_flight.push((Instant::now(), handle)),
                    Err(e) => {
                        debug!(error = %e, "Dispatch rejected at build time");
                        dispatch_stats.record_build_error();
                    }
                }
            }
        }

        // Wait for asynchronous dispatches to resolve, bounded per handle.
        let stream = blueprint.adapter.stream.clone().unwrap_or_default();
        for (sent_at, handle) in in_flight {
            match tokio::time::timeout(self.config.drain_timeout, handle.wait()).await {
                Ok(Ok(_)) => {
                    dispatch_stats.record_completed(true, sent_at.elapsed().as_secs_f64() * 1000.0);
                    observability::record_dispatch_completed(&stream, true);
                }
                Ok(Err(_)) => {
                    dispatch_stats
                        .record_completed(false, sent_at.elapsed().as_secs_f64() * 1000.0);
                    observability::record_dispatch_completed(&stream, false);
                }
                Err(_) => {
                    warn!("Dispatch still unresolved after drain timeout");
                    dispatch_stats.record_timed_out();
                }
            }
        }

        let duration = start.elapsed();

        // Handles resolve after routing, so a short grace period is enough
        // for sink deliveries to land.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut delivered_by_sink = HashMap::new();
        for drain in drains {
            delivered_by_sink.insert(drain.name, drain.received.load(Ordering::Relaxed));
            drain.task.abort();
        }

        let adapter_metrics = adapter.metrics();
        info!(
            submitted = adapter_metrics.submitted,
            succeeded = adapter_metrics.succeeded,
            failed = adapter_metrics.failed,
            "Relay run finished"
        );

        Ok(RunStats {
            dispatch: dispatch_stats,
            duration,
            records_accepted: producer.records_accepted(),
            delivered_by_sink,
        })
    }
}

/// Build the named sinks and their drain tasks
fn build_sinks(blueprint: &RelayBlueprint) -> (Arc<SinkRegistry>, Vec<SinkDrain>) {
    let registry = Arc::new(SinkRegistry::new());
    let mut drains = Vec::new();

    for sink_config in &blueprint.sinks {
        match sink_config.kind {
            SinkKind::Log => {
                registry.register(&sink_config.name, Arc::new(LogSink::new(&sink_config.name)));
            }
            SinkKind::Channel => {
                let (sink, mut rx) =
                    ChannelSink::new(&sink_config.name, sink_config.queue_capacity);
                registry.register(&sink_config.name, Arc::new(sink));

                let received = Arc::new(AtomicU64::new(0));
                let counter = Arc::clone(&received);
                let task = tokio::spawn(async move {
                    while rx.recv().await.is_some() {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                });
                drains.push(SinkDrain {
                    name: sink_config.name.clone(),
                    received,
                    task,
                });
            }
        }
    }

    (registry, drains)
}

/// Build the adapter from blueprint settings
fn build_adapter(
    blueprint: &RelayBlueprint,
    producer: Arc<LoopbackProducer>,
    registry: &Arc<SinkRegistry>,
) -> Result<PutAdapter> {
    let settings = &blueprint.adapter;
    let mut builder = PutAdapter::builder(producer).sync(settings.sync);

    if let Some(stream) = &settings.stream {
        builder = builder.stream(stream);
    }
    if let Some(partition_key) = &settings.partition_key {
        builder = builder.partition_key(partition_key);
    }
    if let Some(explicit_hash_key) = &settings.explicit_hash_key {
        builder = builder.explicit_hash_key(explicit_hash_key);
    }
    if let Some(timeout_ms) = settings.send_timeout_ms {
        builder = builder.send_timeout_ms(timeout_ms);
    }
    if let Some(name) = &settings.output_sink {
        builder = builder.output_sink(registry.resolve(name)?);
    }
    if let Some(name) = &settings.failure_sink {
        builder = builder.failure_sink_name(
            name,
            Arc::clone(registry) as Arc<dyn SinkResolver>,
        );
    }

    Ok(builder.build()?)
}

/// Generate one demo message
///
/// Partition keys rotate so records spread across shards; the payload goes
/// through the adapter's JSON converter.
fn generate_message(index: u64, partitions: u32) -> Message {
    let partition = index % u64::from(partitions.max(1));
    Message::from_value(serde_json::json!({ "index": index }))
        .with_header(header_names::PARTITION_KEY, format!("pk-{partition}"))
}

fn payload_size(message: &Message) -> usize {
    match &message.payload {
        contracts::Payload::Bytes(b) => b.len(),
        contracts::Payload::Value(v) => v.to_string().len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AdapterSettings, ConfigVersion, ProducerSettings, SinkSettings};

    fn blueprint(sync: bool) -> RelayBlueprint {
        RelayBlueprint {
            version: ConfigVersion::V1,
            producer: ProducerSettings::default(),
            adapter: AdapterSettings {
                stream: Some("demo".to_string()),
                partition_key: None,
                explicit_hash_key: None,
                sync,
                send_timeout_ms: Some(1000),
                output_sink: Some("out".to_string()),
                failure_sink: Some("errors".to_string()),
            },
            sinks: vec![
                SinkSettings {
                    name: "out".to_string(),
                    kind: SinkKind::Channel,
                    queue_capacity: 64,
                },
                SinkSettings {
                    name: "errors".to_string(),
                    kind: SinkKind::Channel,
                    queue_capacity: 64,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_driver_delivers_every_record() {
        let driver = RelayDriver::new(DriverConfig {
            blueprint: blueprint(true),
            count: 10,
            partitions: 4,
            drain_timeout: Duration::from_secs(2),
        });

        let stats = driver.run().await.unwrap();
        assert_eq!(stats.dispatch.submitted, 10);
        assert_eq!(stats.dispatch.succeeded, 10);
        assert_eq!(stats.records_accepted, 10);
        assert_eq!(stats.delivered_by_sink.get("out"), Some(&10));
        assert_eq!(stats.delivered_by_sink.get("errors"), Some(&0));
    }

    #[tokio::test]
    async fn test_driver_async_mode_drains_handles() {
        let driver = RelayDriver::new(DriverConfig {
            blueprint: blueprint(false),
            count: 5,
            partitions: 2,
            drain_timeout: Duration::from_secs(2),
        });

        let stats = driver.run().await.unwrap();
        assert_eq!(stats.dispatch.succeeded, 5);
        assert_eq!(stats.delivered_by_sink.get("out"), Some(&5));
    }

    #[tokio::test]
    async fn test_driver_routes_failures() {
        let mut bp = blueprint(false);
        bp.producer.fail_streams = vec!["demo".to_string()];

        let driver = RelayDriver::new(DriverConfig {
            blueprint: bp,
            count: 3,
            partitions: 2,
            drain_timeout: Duration::from_secs(2),
        });

        let stats = driver.run().await.unwrap();
        assert_eq!(stats.dispatch.failed, 3);
        assert_eq!(stats.delivered_by_sink.get("out"), Some(&0));
        assert_eq!(stats.delivered_by_sink.get("errors"), Some(&3));
    }
}
