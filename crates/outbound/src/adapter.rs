//! PutAdapter - build, dispatch, and optionally wait
//!
//! The adapter's dispatch path runs on the caller's task: resolve the
//! request, hand it to the producer, spawn the completion task that routes
//! the outcome. Only a synchronous-mode caller ever waits, and only inside
//! the bounded wait on the dispatch handle.

use std::sync::Arc;

use contracts::{DispatchOutcome, Message, OutboundRequest, Payload, ProduceAck};
use producer::StreamProducer;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

use crate::builder::build_put_record;
use crate::config::{AdapterConfig, PutAdapterBuilder};
use crate::error::DispatchError;
use crate::handle::DispatchHandle;
use crate::metrics::{AdapterMetrics, MetricsSnapshot};
use crate::router::ResultRouter;

/// Outbound put-record adapter
///
/// Cheap to share: all state is behind `Arc`s and read-only after build.
pub struct PutAdapter {
    producer: Arc<dyn StreamProducer>,
    config: Arc<AdapterConfig>,
    metrics: Arc<AdapterMetrics>,
}

impl PutAdapter {
    /// Start building an adapter for the given producer client
    pub fn builder(producer: Arc<dyn StreamProducer>) -> PutAdapterBuilder {
        PutAdapterBuilder::new(producer)
    }

    pub(crate) fn from_parts(
        producer: Arc<dyn StreamProducer>,
        config: Arc<AdapterConfig>,
        metrics: Arc<AdapterMetrics>,
    ) -> Self {
        Self {
            producer,
            config,
            metrics,
        }
    }

    pub(crate) fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Snapshot of this adapter's counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Handle one message: dispatch, and in synchronous mode wait
    ///
    /// Asynchronous mode returns `Ok(None)` immediately after submission;
    /// the outcome is observed only through the configured sinks and
    /// observer. Synchronous mode waits for the routed outcome, bounded by
    /// the per-message timeout source, and returns the ack.
    ///
    /// # Errors
    /// - build-time: [`DispatchError::Configuration`],
    ///   [`DispatchError::Conversion`]
    /// - synchronous mode only: [`DispatchError::SendTimeout`],
    ///   [`DispatchError::Remote`]
    #[instrument(name = "put_adapter_send", skip(self, message), fields(sync = self.config.sync))]
    pub async fn send(&self, message: Message) -> Result<Option<ProduceAck>, DispatchError> {
        let handle = self.dispatch(message)?;

        if !self.config.sync {
            return Ok(None);
        }

        match self.config.resolve_send_timeout_ms(handle.original()) {
            None => handle.wait().await.map(Some),
            Some(timeout_ms) => {
                let result = handle
                    .wait_timeout(std::time::Duration::from_millis(timeout_ms))
                    .await;
                if matches!(&result, Err(DispatchError::SendTimeout { .. })) {
                    self.metrics.inc_timed_out();
                }
                result.map(Some)
            }
        }
    }

    /// Dispatch one message without waiting
    ///
    /// Builds the request (or passes a pre-built payload through verbatim),
    /// submits it, and spawns the completion task. The returned handle
    /// resolves once the outcome has been routed; dropping it changes
    /// nothing about the dispatch.
    ///
    /// # Errors
    /// Build-time errors only; nothing is submitted when this fails.
    #[instrument(name = "put_adapter_dispatch", skip(self, message))]
    pub fn dispatch(&self, message: Message) -> Result<DispatchHandle, DispatchError> {
        let request = self.resolve_request(&message).inspect_err(|_| {
            self.metrics.inc_build_errors();
        })?;

        let future = match &request {
            OutboundRequest::Single(record) => self.producer.put_record(record.clone()),
            OutboundRequest::Batch(batch) => self.producer.put_record_batch(batch.clone()),
        };
        self.metrics.inc_submitted();
        debug!(
            stream = request.stream(),
            records = request.record_count(),
            "Request submitted"
        );

        let (tx, rx) = oneshot::channel();
        let handle = DispatchHandle::new(rx, message.clone());

        let router = ResultRouter::new(Arc::clone(&self.config), Arc::clone(&self.metrics));
        tokio::spawn(async move {
            let result = future.await;
            let outcome = match result.clone() {
                Ok(ack) => DispatchOutcome::Success { request, ack },
                Err(cause) => DispatchOutcome::Failure { request, cause },
            };
            router.route(&message, outcome);
            // Waiters resolve only after routing; dropped handles are fine.
            let _ = tx.send(result);
        });

        Ok(handle)
    }

    fn resolve_request(&self, message: &Message) -> Result<OutboundRequest, DispatchError> {
        match &message.payload {
            Payload::Single(record) => Ok(OutboundRequest::Single(record.clone())),
            Payload::Batch(batch) => Ok(OutboundRequest::Batch(batch.clone())),
            Payload::Bytes(_) | Payload::Value(_) => {
                build_put_record(message, &self.config).map(OutboundRequest::Single)
            }
            Payload::Failure(_) => Err(DispatchError::configuration(
                "payload",
                "failure envelopes cannot be dispatched",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{header_names, ProducerError, PutRecord, PutRecordBatch, RecordAck};
    use producer::{MockProducerConfig, MockStreamProducer};
    use std::time::Duration;

    fn message() -> Message {
        Message::from_bytes(&b"hello"[..])
            .with_header(header_names::STREAM, "s1")
            .with_header(header_names::PARTITION_KEY, "p1")
    }

    #[tokio::test]
    async fn test_async_send_returns_immediately() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock.clone()).build().unwrap();

        // Returns without any completion having fired.
        let result = adapter.send(message()).await.unwrap();
        assert!(result.is_none());
        assert_eq!(mock.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_sync_send_returns_ack() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock).sync(true).build().unwrap();

        let ack = adapter.send(message()).await.unwrap();
        assert!(matches!(ack, Some(ProduceAck::Record(_))));
    }

    #[tokio::test]
    async fn test_sync_send_times_out_while_dispatch_continues() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock.clone())
            .sync(true)
            .send_timeout_ms(50)
            .build()
            .unwrap();

        let err = adapter.send(message()).await.unwrap_err();
        assert!(matches!(err, DispatchError::SendTimeout { timeout_ms: 50, .. }));
        assert_eq!(adapter.metrics().timed_out, 1);

        // The dispatch was not cancelled by the caller-side timeout.
        assert_eq!(mock.take_pending().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_send_propagates_remote_failure() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            fail_streams: vec!["s1".to_string()],
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock).sync(true).build().unwrap();

        let err = adapter.send(message()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Remote(_)));
    }

    #[tokio::test]
    async fn test_build_error_submits_nothing() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock.clone()).build().unwrap();

        let err = adapter
            .send(Message::from_bytes(&b"hello"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Configuration { .. }));
        assert_eq!(mock.submitted_count(), 0);
        assert_eq!(adapter.metrics().build_errors, 1);
    }

    #[tokio::test]
    async fn test_prebuilt_single_request_bypasses_builder() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock.clone()).sync(true).build().unwrap();

        // No stream/partition-key headers or sources needed.
        let record = PutRecord {
            stream: "prebuilt".to_string(),
            partition_key: "p".to_string(),
            explicit_hash_key: None,
            sequence_number_for_ordering: None,
            data: bytes::Bytes::from_static(b"raw"),
        };
        adapter.send(Message::from_record(record)).await.unwrap();

        let submissions = mock.submissions();
        assert!(matches!(
            &submissions[0],
            OutboundRequest::Single(r) if r.stream == "prebuilt"
        ));
    }

    #[tokio::test]
    async fn test_prebuilt_batch_request_passes_through() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock.clone()).sync(true).build().unwrap();

        let batch = PutRecordBatch {
            stream: "prebuilt".to_string(),
            entries: Vec::new(),
        };
        let ack = adapter.send(Message::from_batch(batch)).await.unwrap();

        assert!(matches!(ack, Some(ProduceAck::Batch(_))));
        assert!(matches!(&mock.submissions()[0], OutboundRequest::Batch(_)));
    }

    #[tokio::test]
    async fn test_dispatch_handle_resolves_after_manual_completion() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock.clone()).build().unwrap();

        let handle = adapter.dispatch(message()).unwrap();
        let mut pending = mock.take_pending();
        pending.pop().unwrap().succeed(ProduceAck::Record(RecordAck {
            shard_id: "shard-0001".to_string(),
            sequence_number: "100".to_string(),
        }));

        let ack = handle.wait().await.unwrap();
        assert!(matches!(ack, ProduceAck::Record(ref a) if a.sequence_number == "100"));
    }

    #[tokio::test]
    async fn test_negative_timeout_waits_indefinitely() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            completion_delay: Some(Duration::from_millis(30)),
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock)
            .sync(true)
            .send_timeout_ms(-1)
            .build()
            .unwrap();

        let ack = adapter.send(message()).await.unwrap();
        assert!(ack.is_some());
    }

    #[tokio::test]
    async fn test_per_message_timeout_source() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let adapter = PutAdapter::builder(mock)
            .sync(true)
            .send_timeout_fn(|m: &Message| {
                m.header("deadline-ms").and_then(|v| v.parse().ok())
            })
            .build()
            .unwrap();

        let err = adapter
            .send(message().with_header("deadline-ms", "25"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::SendTimeout { timeout_ms: 25, .. }));
    }
}
