//! Loopback producer
//!
//! In-memory stand-in for the remote ingestion service: hash-routes records
//! to a fixed set of shards and assigns monotonically increasing sequence
//! numbers per shard. Used by the demo CLI and end-to-end tests.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use contracts::{
    BatchAck, BatchEntryAck, ProduceAck, ProducerError, ProducerSettings, PutRecord,
    PutRecordBatch, RecordAck,
};
use tracing::{debug, instrument};

use crate::producer::{ProduceFuture, StreamProducer};

struct LoopbackState {
    /// (stream, shard index) -> next sequence number
    sequences: Mutex<HashMap<(String, u32), u64>>,
    records_accepted: AtomicU64,
}

/// In-memory stream producer
pub struct LoopbackProducer {
    shard_count: u32,
    completion_delay: Duration,
    fail_streams: Vec<String>,
    state: LoopbackState,
}

impl LoopbackProducer {
    /// Create a loopback producer with the given shard count
    pub fn new(shard_count: u32) -> Self {
        Self {
            shard_count: shard_count.max(1),
            completion_delay: Duration::ZERO,
            fail_streams: Vec::new(),
            state: LoopbackState {
                sequences: Mutex::new(HashMap::new()),
                records_accepted: AtomicU64::new(0),
            },
        }
    }

    /// Create a loopback producer from blueprint settings
    pub fn from_settings(settings: &ProducerSettings) -> Self {
        let mut producer = Self::new(settings.shard_count);
        producer.completion_delay = Duration::from_millis(settings.completion_delay_ms);
        producer.fail_streams = settings.fail_streams.clone();
        producer
    }

    /// Total records accepted across all streams
    pub fn records_accepted(&self) -> u64 {
        self.state.records_accepted.load(Ordering::Relaxed)
    }

    /// Shard a partition key routes to
    pub fn shard_for(&self, partition_key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        partition_key.hash(&mut hasher);
        (hasher.finish() % u64::from(self.shard_count)) as u32
    }

    fn accept(&self, stream: &str, partition_key: &str) -> RecordAck {
        let shard = self.shard_for(partition_key);
        let mut sequences = self.state.sequences.lock().unwrap();
        let sequence = sequences
            .entry((stream.to_string(), shard))
            .and_modify(|s| *s += 1)
            .or_insert(1);
        self.state.records_accepted.fetch_add(1, Ordering::Relaxed);

        RecordAck {
            shard_id: format!("shard-{shard:04}"),
            sequence_number: sequence.to_string(),
        }
    }

    fn reject_if_failing(&self, stream: &str) -> Result<(), ProducerError> {
        if self.fail_streams.iter().any(|s| s == stream) {
            Err(ProducerError::throttled(stream, "loopback stream configured to fail"))
        } else {
            Ok(())
        }
    }

    fn complete(&self, outcome: Result<ProduceAck, ProducerError>) -> ProduceFuture {
        let delay = self.completion_delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

impl StreamProducer for LoopbackProducer {
    #[instrument(
        name = "loopback_put_record",
        skip(self, request),
        fields(stream = %request.stream, partition_key = %request.partition_key)
    )]
    fn put_record(&self, request: PutRecord) -> ProduceFuture {
        let outcome = self.reject_if_failing(&request.stream).map(|()| {
            let ack = self.accept(&request.stream, &request.partition_key);
            debug!(shard = %ack.shard_id, sequence = %ack.sequence_number, "Record accepted");
            ProduceAck::Record(ack)
        });

        self.complete(outcome)
    }

    #[instrument(
        name = "loopback_put_record_batch",
        skip(self, request),
        fields(stream = %request.stream, records = request.entries.len())
    )]
    fn put_record_batch(&self, request: PutRecordBatch) -> ProduceFuture {
        let outcome = self.reject_if_failing(&request.stream).map(|()| {
            let entries: Vec<BatchEntryAck> = request
                .entries
                .iter()
                .map(|entry| {
                    let ack = self.accept(&request.stream, &entry.partition_key);
                    BatchEntryAck {
                        shard_id: Some(ack.shard_id),
                        sequence_number: Some(ack.sequence_number),
                        error_code: None,
                        error_message: None,
                    }
                })
                .collect();

            ProduceAck::Batch(BatchAck {
                entries,
                failed_count: 0,
            })
        });

        self.complete(outcome)
    }
}
