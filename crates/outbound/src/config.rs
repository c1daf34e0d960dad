//! Adapter configuration surface
//!
//! Assembled once through [`PutAdapterBuilder`], frozen behind an `Arc`,
//! and shared by concurrent dispatches without locking. The lazily-resolved
//! named failure sink is the only mutable piece, guarded by a `OnceLock`.

use std::sync::{Arc, OnceLock};

use contracts::{
    CompletionObserver, JsonConverter, Message, MessageSink, PayloadConverter, RelayError,
    SinkResolver, ValueSource,
};
use producer::StreamProducer;

use crate::adapter::PutAdapter;
use crate::metrics::AdapterMetrics;

/// Default bound for the synchronous wait, in milliseconds
pub const DEFAULT_SEND_TIMEOUT_MS: i64 = 10_000;

/// Failure sink reference: direct, or resolved by name on first use
pub enum FailureSinkRef {
    /// Direct sink reference
    Direct(Arc<dyn MessageSink>),

    /// Deferred name, resolved lazily through a [`SinkResolver`] and cached
    Named {
        name: String,
        resolver: Arc<dyn SinkResolver>,
        cell: OnceLock<Arc<dyn MessageSink>>,
    },
}

impl FailureSinkRef {
    /// Resolve the sink, caching named lookups
    ///
    /// Resolution is deterministic and side-effect-free, so a concurrent
    /// double resolution settles on whichever entry wins the cell.
    ///
    /// # Errors
    /// Returns [`RelayError::SinkResolution`] when the name is unknown
    pub fn resolve(&self) -> Result<Arc<dyn MessageSink>, RelayError> {
        match self {
            Self::Direct(sink) => Ok(Arc::clone(sink)),
            Self::Named {
                name,
                resolver,
                cell,
            } => {
                if let Some(sink) = cell.get() {
                    return Ok(Arc::clone(sink));
                }
                let resolved = resolver.resolve(name)?;
                let _ = cell.set(Arc::clone(&resolved));
                Ok(Arc::clone(cell.get().unwrap_or(&resolved)))
            }
        }
    }
}

/// Immutable adapter configuration
pub struct AdapterConfig {
    pub(crate) stream: Option<ValueSource<String>>,
    pub(crate) partition_key: Option<ValueSource<String>>,
    pub(crate) explicit_hash_key: Option<ValueSource<String>>,
    pub(crate) sequence_number: Option<ValueSource<String>>,
    pub(crate) converter: Arc<dyn PayloadConverter>,
    pub(crate) sync: bool,
    pub(crate) send_timeout: ValueSource<i64>,
    pub(crate) output_sink: Option<Arc<dyn MessageSink>>,
    pub(crate) failure_sink: Option<FailureSinkRef>,
    pub(crate) observer: Option<Arc<dyn CompletionObserver>>,
}

impl AdapterConfig {
    /// Per-message synchronous wait bound
    ///
    /// `None` means wait indefinitely: either the source resolved to
    /// nothing or to a negative value.
    pub(crate) fn resolve_send_timeout_ms(&self, message: &Message) -> Option<u64> {
        match self.send_timeout.resolve(message) {
            Some(ms) if ms >= 0 => Some(ms as u64),
            _ => None,
        }
    }
}

/// Builder for a [`PutAdapter`]
///
/// Every expression-backed field of the adapter has a literal setter and a
/// computed (`*_fn`) setter; the computed variant is resolved per message.
pub struct PutAdapterBuilder {
    producer: Arc<dyn StreamProducer>,
    stream: Option<ValueSource<String>>,
    partition_key: Option<ValueSource<String>>,
    explicit_hash_key: Option<ValueSource<String>>,
    sequence_number: Option<ValueSource<String>>,
    converter: Arc<dyn PayloadConverter>,
    sync: bool,
    send_timeout: ValueSource<i64>,
    output_sink: Option<Arc<dyn MessageSink>>,
    failure_sink: Option<FailureSinkRef>,
    observer: Option<Arc<dyn CompletionObserver>>,
}

impl PutAdapterBuilder {
    /// Start a builder for the given producer client
    pub fn new(producer: Arc<dyn StreamProducer>) -> Self {
        Self {
            producer,
            stream: None,
            partition_key: None,
            explicit_hash_key: None,
            sequence_number: None,
            converter: Arc::new(JsonConverter),
            sync: false,
            send_timeout: ValueSource::literal(DEFAULT_SEND_TIMEOUT_MS),
            output_sink: None,
            failure_sink: None,
            observer: None,
        }
    }

    /// Fixed destination stream
    pub fn stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(ValueSource::literal(stream.into()));
        self
    }

    /// Per-message destination stream
    pub fn stream_fn(
        mut self,
        f: impl Fn(&Message) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.stream = Some(ValueSource::computed(f));
        self
    }

    /// Fixed partition key
    pub fn partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(ValueSource::literal(partition_key.into()));
        self
    }

    /// Per-message partition key
    pub fn partition_key_fn(
        mut self,
        f: impl Fn(&Message) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.partition_key = Some(ValueSource::computed(f));
        self
    }

    /// Fixed explicit hash key
    pub fn explicit_hash_key(mut self, explicit_hash_key: impl Into<String>) -> Self {
        self.explicit_hash_key = Some(ValueSource::literal(explicit_hash_key.into()));
        self
    }

    /// Per-message explicit hash key
    pub fn explicit_hash_key_fn(
        mut self,
        f: impl Fn(&Message) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.explicit_hash_key = Some(ValueSource::computed(f));
        self
    }

    /// Fixed ordering sequence number
    pub fn sequence_number(mut self, sequence_number: impl Into<String>) -> Self {
        self.sequence_number = Some(ValueSource::literal(sequence_number.into()));
        self
    }

    /// Per-message ordering sequence number
    pub fn sequence_number_fn(
        mut self,
        f: impl Fn(&Message) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.sequence_number = Some(ValueSource::computed(f));
        self
    }

    /// Replace the payload-to-bytes converter (default: JSON)
    pub fn converter(mut self, converter: Arc<dyn PayloadConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Block each `send` until the dispatch outcome is routed
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Fixed synchronous wait bound in milliseconds; negative waits forever
    pub fn send_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.send_timeout = ValueSource::literal(timeout_ms);
        self
    }

    /// Per-message synchronous wait bound
    pub fn send_timeout_fn(
        mut self,
        f: impl Fn(&Message) -> Option<i64> + Send + Sync + 'static,
    ) -> Self {
        self.send_timeout = ValueSource::computed(f);
        self
    }

    /// Sink receiving enriched success messages
    pub fn output_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.output_sink = Some(sink);
        self
    }

    /// Sink receiving failure envelopes
    pub fn failure_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.failure_sink = Some(FailureSinkRef::Direct(sink));
        self
    }

    /// Failure sink by deferred name, resolved lazily on first failure
    pub fn failure_sink_name(
        mut self,
        name: impl Into<String>,
        resolver: Arc<dyn SinkResolver>,
    ) -> Self {
        self.failure_sink = Some(FailureSinkRef::Named {
            name: name.into(),
            resolver,
            cell: OnceLock::new(),
        });
        self
    }

    /// User-supplied completion observer, invoked before sink routing
    pub fn observer(mut self, observer: Arc<dyn CompletionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Freeze the configuration and build the adapter
    ///
    /// # Errors
    /// Returns a validation error for empty literal sources
    pub fn build(self) -> Result<PutAdapter, RelayError> {
        if let Some(ValueSource::Literal(stream)) = &self.stream {
            if stream.is_empty() {
                return Err(RelayError::config_validation("stream", "must not be empty"));
            }
        }
        if let Some(ValueSource::Literal(partition_key)) = &self.partition_key {
            if partition_key.is_empty() {
                return Err(RelayError::config_validation(
                    "partition_key",
                    "must not be empty",
                ));
            }
        }

        let config = Arc::new(AdapterConfig {
            stream: self.stream,
            partition_key: self.partition_key,
            explicit_hash_key: self.explicit_hash_key,
            sequence_number: self.sequence_number,
            converter: self.converter,
            sync: self.sync,
            send_timeout: self.send_timeout,
            output_sink: self.output_sink,
            failure_sink: self.failure_sink,
            observer: self.observer,
        });

        Ok(PutAdapter::from_parts(
            self.producer,
            config,
            Arc::new(AdapterMetrics::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use producer::MockStreamProducer;

    #[test]
    fn test_empty_literal_stream_rejected() {
        let result = PutAdapterBuilder::new(Arc::new(MockStreamProducer::new()))
            .stream("")
            .build();

        assert!(matches!(
            result,
            Err(RelayError::ConfigValidation { ref field, .. }) if field == "stream"
        ));
    }

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        let config = AdapterConfig {
            stream: None,
            partition_key: None,
            explicit_hash_key: None,
            sequence_number: None,
            converter: Arc::new(JsonConverter),
            sync: true,
            send_timeout: ValueSource::literal(DEFAULT_SEND_TIMEOUT_MS),
            output_sink: None,
            failure_sink: None,
            observer: None,
        };

        let message = Message::from_bytes(&b"x"[..]);
        assert_eq!(config.resolve_send_timeout_ms(&message), Some(10_000));
    }

    #[test]
    fn test_negative_timeout_means_indefinite() {
        let config = AdapterConfig {
            stream: None,
            partition_key: None,
            explicit_hash_key: None,
            sequence_number: None,
            converter: Arc::new(JsonConverter),
            sync: true,
            send_timeout: ValueSource::literal(-1),
            output_sink: None,
            failure_sink: None,
            observer: None,
        };

        let message = Message::from_bytes(&b"x"[..]);
        assert_eq!(config.resolve_send_timeout_ms(&message), None);
    }
}
