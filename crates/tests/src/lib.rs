//! # Integration Tests
//!
//! End-to-end tests for the relay, driven entirely against the mock and
//! loopback producers.
//!
//! Covers:
//! - Request building precedence and fail-fast behavior
//! - Outcome routing to output and failure sinks
//! - Synchronous wait and timeout semantics

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use bytes::Bytes;
    use contracts::{
        header_names, Message, OutboundRequest, Payload, ProduceAck, ProducerError, RecordAck,
    };
    use outbound::{ChannelSink, DispatchError, PutAdapter, SinkRegistry};
    use producer::{MockProducerConfig, MockStreamProducer, StreamProducer};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn hello_message() -> Message {
        Message::from_bytes(&b"hello"[..])
            .with_header(header_names::STREAM, "s1")
            .with_header(header_names::PARTITION_KEY, "p1")
    }

    async fn recv(rx: &mut mpsc::Receiver<Message>) -> Message {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for sink delivery")
            .expect("sink channel closed")
    }

    /// Headers s1/p1, payload b"hello", async mode. On a simulated success
    /// of shard-0001/100 the output message carries the result headers, the
    /// original headers, and the untouched payload.
    #[tokio::test]
    async fn test_e2e_success_enrichment() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let adapter = PutAdapter::builder(mock.clone())
            .output_sink(Arc::new(output))
            .build()
            .unwrap();

        let message = hello_message().with_header("correlation", "abc");
        adapter.send(message).await.unwrap();

        // The builder produced exactly the expected request.
        let submissions = mock.submissions();
        assert_eq!(submissions.len(), 1);
        match &submissions[0] {
            OutboundRequest::Single(record) => {
                assert_eq!(record.stream, "s1");
                assert_eq!(record.partition_key, "p1");
                assert_eq!(record.data, Bytes::from_static(b"hello"));
                assert_eq!(record.explicit_hash_key, None);
                assert_eq!(record.sequence_number_for_ordering, None);
            }
            other => panic!("expected single-record request, got {other:?}"),
        }

        // Simulated completion on the callback side.
        let mut pending = mock.take_pending();
        pending.pop().unwrap().succeed(ProduceAck::Record(RecordAck {
            shard_id: "shard-0001".to_string(),
            sequence_number: "100".to_string(),
        }));

        let delivered = recv(&mut output_rx).await;
        assert_eq!(delivered.header(header_names::SHARD_ID), Some("shard-0001"));
        assert_eq!(delivered.header(header_names::SEQUENCE_NUMBER), Some("100"));
        assert_eq!(delivered.header("correlation"), Some("abc"));
        assert_eq!(delivered.header(header_names::STREAM), Some("s1"));
        assert!(matches!(delivered.payload, Payload::Bytes(ref b) if b == &b"hello"[..]));
    }

    /// No stream header and no stream source means a configuration error
    /// before any network interaction.
    #[tokio::test]
    async fn test_e2e_missing_stream_fails_before_dispatch() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock.clone()).build().unwrap();

        let message =
            Message::from_bytes(&b"hello"[..]).with_header(header_names::PARTITION_KEY, "p1");
        let err = adapter.send(message).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Configuration { ref field, .. } if field == "stream"
        ));
        assert_eq!(mock.submitted_count(), 0);
    }

    /// Header precedence: with both required headers present, configured
    /// sources are ignored entirely.
    #[tokio::test]
    async fn test_e2e_headers_win_over_configuration() {
        let mock = Arc::new(MockStreamProducer::new());
        let adapter = PutAdapter::builder(mock.clone())
            .stream("configured-stream")
            .partition_key("configured-key")
            .sync(true)
            .build()
            .unwrap();

        adapter.send(hello_message()).await.unwrap();

        match &mock.submissions()[0] {
            OutboundRequest::Single(record) => {
                assert_eq!(record.stream, "s1");
                assert_eq!(record.partition_key, "p1");
            }
            other => panic!("expected single-record request, got {other:?}"),
        }
    }

    /// Failure routing: exactly one envelope to the failure sink, nothing
    /// to the output sink, carrying message, request, and cause.
    #[tokio::test]
    async fn test_e2e_failure_envelope_routing() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            fail_streams: vec!["s1".to_string()],
            ..Default::default()
        }));
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let (failures, mut failures_rx) = ChannelSink::new("errors", 16);
        let adapter = PutAdapter::builder(mock)
            .output_sink(Arc::new(output))
            .failure_sink(Arc::new(failures))
            .build()
            .unwrap();

        let message = hello_message().with_header("correlation", "abc");
        adapter.send(message).await.unwrap();

        let envelope_message = recv(&mut failures_rx).await;
        match &envelope_message.payload {
            Payload::Failure(envelope) => {
                assert_eq!(envelope.original.header("correlation"), Some("abc"));
                assert!(matches!(&envelope.request, OutboundRequest::Single(r) if r.stream == "s1"));
                assert_eq!(envelope.cause, ProducerError::service("mock failure"));
            }
            other => panic!("expected failure payload, got {other:?}"),
        }

        // Nothing reached the output sink for this dispatch.
        assert!(output_rx.try_recv().is_err());
    }

    /// Deferred failure-sink name: resolved lazily through the registry on
    /// first failure, then reused.
    #[tokio::test]
    async fn test_e2e_named_failure_sink_resolution() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            fail_streams: vec!["s1".to_string()],
            ..Default::default()
        }));
        let registry = Arc::new(SinkRegistry::new());
        let (failures, mut failures_rx) = ChannelSink::new("errors", 16);
        registry.register("errors", Arc::new(failures));

        let adapter = PutAdapter::builder(mock)
            .failure_sink_name("errors", registry)
            .build()
            .unwrap();

        adapter.send(hello_message()).await.unwrap();
        adapter.send(hello_message()).await.unwrap();

        recv(&mut failures_rx).await;
        recv(&mut failures_rx).await;
    }

    /// Sync mode with a 50ms bound against a producer that never
    /// completes: the caller gets the timeout at ~50ms, and a later
    /// simulated completion still reaches the result router and the output
    /// sink.
    #[tokio::test]
    async fn test_e2e_sync_timeout_then_late_completion() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let adapter = PutAdapter::builder(mock.clone())
            .output_sink(Arc::new(output))
            .sync(true)
            .send_timeout_ms(50)
            .build()
            .unwrap();

        let started = Instant::now();
        let err = adapter.send(hello_message()).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, DispatchError::SendTimeout { timeout_ms: 50, .. }));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_secs(2), "waited too long: {elapsed:?}");

        // The caller-side timeout did not cancel the dispatch.
        let mut pending = mock.take_pending();
        assert_eq!(pending.len(), 1);
        pending.pop().unwrap().succeed(ProduceAck::Record(RecordAck {
            shard_id: "shard-0002".to_string(),
            sequence_number: "101".to_string(),
        }));

        let delivered = recv(&mut output_rx).await;
        assert_eq!(delivered.header(header_names::SHARD_ID), Some("shard-0002"));
    }

    /// Completion is at most once by construction: the producer's
    /// completion future and the mock's completion handle are both consumed
    /// on use, so a harness cannot produce two outbound messages for one
    /// dispatch.
    #[tokio::test]
    async fn test_e2e_completion_is_exactly_once() {
        let mock = Arc::new(MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        }));
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let adapter = PutAdapter::builder(mock.clone())
            .output_sink(Arc::new(output))
            .build()
            .unwrap();

        adapter.send(hello_message()).await.unwrap();

        let handle = mock.take_pending().pop().unwrap();
        handle.succeed(ProduceAck::Record(RecordAck {
            shard_id: "shard-0001".to_string(),
            sequence_number: "100".to_string(),
        }));
        // `handle` is consumed; completing again does not compile, and no
        // second pending completion exists for this dispatch.
        assert!(mock.take_pending().is_empty());

        recv(&mut output_rx).await;
        assert!(output_rx.try_recv().is_err());
    }

    /// Pre-built batch payloads pass through verbatim and ack with a
    /// service-result header.
    #[tokio::test]
    async fn test_e2e_batch_passthrough() {
        let mock = Arc::new(MockStreamProducer::new());
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let adapter = PutAdapter::builder(mock.clone())
            .output_sink(Arc::new(output))
            .sync(true)
            .build()
            .unwrap();

        let batch = contracts::PutRecordBatch {
            stream: "s1".to_string(),
            entries: vec![contracts::BatchEntry {
                partition_key: "p1".to_string(),
                explicit_hash_key: None,
                data: Bytes::from_static(b"one"),
            }],
        };
        adapter.send(Message::from_batch(batch)).await.unwrap();

        assert!(matches!(&mock.submissions()[0], OutboundRequest::Batch(_)));

        let delivered = recv(&mut output_rx).await;
        let raw = delivered
            .headers
            .get(header_names::SERVICE_RESULT)
            .and_then(|v| v.as_json())
            .expect("service-result header missing");
        assert_eq!(raw["failed_count"], 0);
    }

    /// The loopback producer drives the whole path without mocks: blueprint
    /// -> adapter -> loopback -> output sink.
    #[tokio::test]
    async fn test_e2e_loopback_round_trip() {
        let loopback = Arc::new(producer::LoopbackProducer::new(4));
        let (output, mut output_rx) = ChannelSink::new("out", 16);
        let adapter = PutAdapter::builder(loopback.clone() as Arc<dyn StreamProducer>)
            .stream("orders")
            .sync(true)
            .build()
            .unwrap();

        let message = Message::from_value(serde_json::json!({"id": 1}))
            .with_header(header_names::PARTITION_KEY, "k1");
        // No output sink configured on this adapter: observed only.
        adapter.send(message).await.unwrap();
        assert_eq!(loopback.records_accepted(), 1);

        // Same loopback behind an adapter with an output sink.
        let adapter = PutAdapter::builder(loopback.clone() as Arc<dyn StreamProducer>)
            .stream("orders")
            .output_sink(Arc::new(output))
            .sync(true)
            .build()
            .unwrap();
        let message = Message::from_value(serde_json::json!({"id": 2}))
            .with_header(header_names::PARTITION_KEY, "k1");
        adapter.send(message).await.unwrap();

        let delivered = recv(&mut output_rx).await;
        assert!(delivered.header(header_names::SHARD_ID).is_some());
        assert!(delivered.header(header_names::SEQUENCE_NUMBER).is_some());
    }

    /// Configuration file to running adapter settings round trip.
    #[test]
    fn test_blueprint_loads_for_adapter_wiring() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
[adapter]
stream = "orders"
partition_key = "default"
sync = true
send_timeout_ms = 250
output_sink = "out"
failure_sink = "errors"

[[sinks]]
name = "out"
kind = "channel"

[[sinks]]
name = "errors"
kind = "log"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(blueprint.adapter.stream.as_deref(), Some("orders"));
        assert_eq!(blueprint.adapter.send_timeout_ms, Some(250));
        assert!(blueprint.adapter.sync);
    }
}
