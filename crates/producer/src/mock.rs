//! Mock stream producer
//!
//! Mock implementation for unit tests, supporting injected failure scenarios
//! and manually triggered completions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use contracts::{
    BatchAck, BatchEntryAck, OutboundRequest, ProduceAck, ProducerError, PutRecord, PutRecordBatch,
    RecordAck,
};
use tokio::sync::oneshot;
use tracing::debug;

use crate::producer::{ProduceFuture, StreamProducer};

/// Mock producer configuration
#[derive(Debug, Default, Clone)]
pub struct MockProducerConfig {
    /// Streams whose submissions fail
    pub fail_streams: Vec<String>,

    /// Hold completions until the test triggers them via [`CompletionHandle`]
    pub manual_completion: bool,

    /// Artificial delay before auto completions resolve
    pub completion_delay: Option<Duration>,
}

/// Completion trigger for one held submission
///
/// Consumed on use: a handle can complete its dispatch exactly once, so a
/// test harness cannot double-invoke the completion path.
pub struct CompletionHandle {
    tx: oneshot::Sender<Result<ProduceAck, ProducerError>>,
    request: OutboundRequest,
}

impl CompletionHandle {
    /// The request this completion belongs to
    pub fn request(&self) -> &OutboundRequest {
        &self.request
    }

    /// Complete the dispatch successfully
    pub fn succeed(self, ack: ProduceAck) {
        let _ = self.tx.send(Ok(ack));
    }

    /// Complete the dispatch with a remote failure
    pub fn fail(self, cause: ProducerError) {
        let _ = self.tx.send(Err(cause));
    }
}

struct MockState {
    submitted: Mutex<Vec<OutboundRequest>>,
    pending: Mutex<Vec<CompletionHandle>>,
    next_sequence: AtomicU64,
}

/// Mock stream producer
pub struct MockStreamProducer {
    config: MockProducerConfig,
    state: MockState,
}

impl MockStreamProducer {
    /// Create a mock that completes every submission successfully
    pub fn new() -> Self {
        Self::with_config(MockProducerConfig::default())
    }

    /// Create a mock with injected failure/completion behavior
    pub fn with_config(config: MockProducerConfig) -> Self {
        Self {
            config,
            state: MockState {
                submitted: Mutex::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
                next_sequence: AtomicU64::new(100),
            },
        }
    }

    /// Number of submissions observed so far
    pub fn submitted_count(&self) -> usize {
        self.state.submitted.lock().unwrap().len()
    }

    /// Snapshot of all observed submissions, in order
    pub fn submissions(&self) -> Vec<OutboundRequest> {
        self.state.submitted.lock().unwrap().clone()
    }

    /// Drain the held completions (manual mode only)
    pub fn take_pending(&self) -> Vec<CompletionHandle> {
        self.state.pending.lock().unwrap().drain(..).collect()
    }

    fn record_submission(&self, request: &OutboundRequest) {
        self.state.submitted.lock().unwrap().push(request.clone());
        debug!(stream = request.stream(), records = request.record_count(), "Mock submission");
    }

    fn injected_failure(&self, stream: &str) -> Option<ProducerError> {
        if self.config.fail_streams.iter().any(|s| s == stream) {
            Some(ProducerError::service("mock failure"))
        } else {
            None
        }
    }

    fn submit(&self, request: OutboundRequest) -> ProduceFuture {
        self.record_submission(&request);

        if self.config.manual_completion {
            let (tx, rx) = oneshot::channel();
            self.state.pending.lock().unwrap().push(CompletionHandle { tx, request });
            return Box::pin(async move {
                match rx.await {
                    Ok(outcome) => outcome,
                    // Handle dropped without completing
                    Err(_) => Err(ProducerError::Canceled),
                }
            });
        }

        let outcome = match self.injected_failure(request.stream()) {
            Some(cause) => Err(cause),
            None => Ok(auto_ack(&request, &self.state.next_sequence)),
        };
        let delay = self.config.completion_delay;

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

impl Default for MockStreamProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamProducer for MockStreamProducer {
    fn put_record(&self, request: PutRecord) -> ProduceFuture {
        self.submit(OutboundRequest::Single(request))
    }

    fn put_record_batch(&self, request: PutRecordBatch) -> ProduceFuture {
        self.submit(OutboundRequest::Batch(request))
    }
}

fn auto_ack(request: &OutboundRequest, next_sequence: &AtomicU64) -> ProduceAck {
    match request {
        OutboundRequest::Single(record) => ProduceAck::Record(RecordAck {
            shard_id: shard_for(&record.partition_key),
            sequence_number: next_sequence.fetch_add(1, Ordering::SeqCst).to_string(),
        }),
        OutboundRequest::Batch(batch) => ProduceAck::Batch(BatchAck {
            entries: batch
                .entries
                .iter()
                .map(|entry| BatchEntryAck {
                    shard_id: Some(shard_for(&entry.partition_key)),
                    sequence_number: Some(
                        next_sequence.fetch_add(1, Ordering::SeqCst).to_string(),
                    ),
                    error_code: None,
                    error_message: None,
                })
                .collect(),
            failed_count: 0,
        }),
    }
}

fn shard_for(partition_key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    partition_key.hash(&mut hasher);
    format!("shard-{:04}", hasher.finish() % 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn record(stream: &str) -> PutRecord {
        PutRecord {
            stream: stream.to_string(),
            partition_key: "p1".to_string(),
            explicit_hash_key: None,
            sequence_number_for_ordering: None,
            data: Bytes::from_static(b"payload"),
        }
    }

    #[tokio::test]
    async fn test_auto_completion_succeeds() {
        let producer = MockStreamProducer::new();
        let ack = producer.put_record(record("orders")).await.unwrap();

        assert!(matches!(ack, ProduceAck::Record(_)));
        assert_eq!(producer.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let producer = MockStreamProducer::with_config(MockProducerConfig {
            fail_streams: vec!["orders".to_string()],
            ..Default::default()
        });

        let result = producer.put_record(record("orders")).await;
        assert_eq!(result, Err(ProducerError::service("mock failure")));
    }

    #[tokio::test]
    async fn test_manual_completion_resolves_later() {
        let producer = MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        });

        let future = producer.put_record(record("orders"));
        let mut pending = producer.take_pending();
        assert_eq!(pending.len(), 1);

        pending.pop().unwrap().succeed(ProduceAck::Record(RecordAck {
            shard_id: "shard-0001".to_string(),
            sequence_number: "100".to_string(),
        }));

        let ack = future.await.unwrap();
        assert!(matches!(ack, ProduceAck::Record(ref a) if a.shard_id == "shard-0001"));
    }

    #[tokio::test]
    async fn test_dropped_handle_cancels() {
        let producer = MockStreamProducer::with_config(MockProducerConfig {
            manual_completion: true,
            ..Default::default()
        });

        let future = producer.put_record(record("orders"));
        drop(producer.take_pending());

        assert_eq!(future.await, Err(ProducerError::Canceled));
    }

    #[tokio::test]
    async fn test_batch_ack_covers_every_entry() {
        let producer = MockStreamProducer::new();
        let batch = PutRecordBatch {
            stream: "orders".to_string(),
            entries: vec![
                contracts::BatchEntry {
                    partition_key: "a".to_string(),
                    explicit_hash_key: None,
                    data: Bytes::from_static(b"one"),
                },
                contracts::BatchEntry {
                    partition_key: "b".to_string(),
                    explicit_hash_key: None,
                    data: Bytes::from_static(b"two"),
                },
            ],
        };

        let ack = producer.put_record_batch(batch).await.unwrap();
        match ack {
            ProduceAck::Batch(batch_ack) => {
                assert_eq!(batch_ack.entries.len(), 2);
                assert_eq!(batch_ack.failed_count, 0);
            }
            other => panic!("expected batch ack, got {other:?}"),
        }
    }
}
