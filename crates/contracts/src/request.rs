//! Put-request model and service acks
//!
//! The wire-level shapes exchanged with the stream-ingestion service:
//! single-record and batch put requests on the way out, record and batch
//! acks on the way back.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Single-record put request
///
/// Invariant: `stream` and `partition_key` are non-empty. The request
/// builder enforces this before any dispatch; a violated invariant is a
/// configuration error, never a silently dropped send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutRecord {
    /// Destination stream name
    pub stream: String,

    /// Shard routing key
    pub partition_key: String,

    /// Optional hash override bypassing partition-key-derived routing
    pub explicit_hash_key: Option<String>,

    /// Optional ordering token for records sharing a partition key
    pub sequence_number_for_ordering: Option<String>,

    /// Record payload
    pub data: Bytes,
}

/// One record of a batch put request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Shard routing key
    pub partition_key: String,

    /// Optional hash override
    pub explicit_hash_key: Option<String>,

    /// Record payload
    pub data: Bytes,
}

/// Pre-built batch put request, dispatched verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutRecordBatch {
    /// Destination stream name
    pub stream: String,

    /// Batch records
    pub entries: Vec<BatchEntry>,
}

/// The request actually handed to the producer client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutboundRequest {
    /// Single-record put
    Single(PutRecord),
    /// Batch put, passed through unchanged
    Batch(PutRecordBatch),
}

impl OutboundRequest {
    /// Destination stream of this request
    pub fn stream(&self) -> &str {
        match self {
            Self::Single(record) => &record.stream,
            Self::Batch(batch) => &batch.stream,
        }
    }

    /// Number of records carried by this request
    pub fn record_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(batch) => batch.entries.len(),
        }
    }

    /// Total payload bytes carried by this request
    pub fn payload_bytes(&self) -> usize {
        match self {
            Self::Single(record) => record.data.len(),
            Self::Batch(batch) => batch.entries.iter().map(|e| e.data.len()).sum(),
        }
    }
}

/// Ack for a single-record put
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordAck {
    /// Shard that accepted the record
    pub shard_id: String,

    /// Sequence number assigned by the service
    pub sequence_number: String,
}

/// Per-entry result of a batch put
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntryAck {
    /// Shard that accepted the record, absent on entry failure
    pub shard_id: Option<String>,

    /// Assigned sequence number, absent on entry failure
    pub sequence_number: Option<String>,

    /// Service error code for a failed entry
    pub error_code: Option<String>,

    /// Service error message for a failed entry
    pub error_message: Option<String>,
}

/// Ack for a batch put
///
/// A batch ack with `failed_count > 0` is still a successful dispatch; the
/// per-entry outcome is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAck {
    /// Per-entry results, in request order
    pub entries: Vec<BatchEntryAck>,

    /// Number of entries the service rejected
    pub failed_count: usize,
}

/// Service result of a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProduceAck {
    /// Single-record ack
    Record(RecordAck),
    /// Batch ack
    Batch(BatchAck),
}
