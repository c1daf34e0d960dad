//! RelayBlueprint - Config Loader output
//!
//! Declarative configuration for a relay deployment: producer settings,
//! adapter field sources, and outbound sink routing. Consumed by the CLI;
//! programmatic users wire the adapter builder directly.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Producer client settings
    #[serde(default)]
    #[validate(nested)]
    pub producer: ProducerSettings,

    /// Adapter field sources and dispatch mode
    #[validate(nested)]
    pub adapter: AdapterSettings,

    /// Named sinks available for routing
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkSettings>,
}

/// Producer client settings (loopback producer used by the CLI)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProducerSettings {
    /// Shards per stream
    #[validate(range(min = 1, max = 1024))]
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,

    /// Artificial completion delay, for exercising timeouts (ms)
    #[serde(default)]
    pub completion_delay_ms: u64,

    /// Streams the producer rejects, for exercising the failure path
    #[serde(default)]
    pub fail_streams: Vec<String>,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
            completion_delay_ms: 0,
            fail_streams: Vec::new(),
        }
    }
}

fn default_shard_count() -> u32 {
    4
}

/// Adapter configuration
///
/// Each optional field is a literal source; per-message computed sources
/// are a programmatic-only surface.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdapterSettings {
    /// Destination stream when the message carries no stream header
    #[validate(length(min = 1))]
    pub stream: Option<String>,

    /// Partition key when the message carries no partition-key header
    #[validate(length(min = 1))]
    pub partition_key: Option<String>,

    /// Optional explicit hash key literal
    pub explicit_hash_key: Option<String>,

    /// Block the caller until each dispatch completes
    #[serde(default)]
    pub sync: bool,

    /// Bound for the synchronous wait (ms); negative means wait indefinitely
    pub send_timeout_ms: Option<i64>,

    /// Name of the sink receiving enriched success messages
    pub output_sink: Option<String>,

    /// Name of the sink receiving failure envelopes
    pub failure_sink: Option<String>,
}

/// Named sink definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkSettings {
    /// Unique sink name
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink implementation
    pub kind: SinkKind,

    /// Queue capacity for channel sinks
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Log message summaries via tracing
    Log,
    /// Buffer messages on an in-process channel
    Channel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let producer = ProducerSettings::default();
        assert_eq!(producer.shard_count, 4);
        assert_eq!(producer.completion_delay_ms, 0);
        assert!(producer.fail_streams.is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_shards() {
        let blueprint = RelayBlueprint {
            version: ConfigVersion::V1,
            producer: ProducerSettings {
                shard_count: 0,
                ..Default::default()
            },
            adapter: AdapterSettings {
                stream: Some("orders".to_string()),
                partition_key: Some("p".to_string()),
                explicit_hash_key: None,
                sync: false,
                send_timeout_ms: None,
                output_sink: None,
                failure_sink: None,
            },
            sinks: Vec::new(),
        };

        assert!(blueprint.validate().is_err());
    }
}
