//! Message envelope
//!
//! The generic unit flowing through the pipeline: an opaque payload plus a
//! header map. The adapter never interprets payloads beyond the closed
//! variants below.

use bytes::Bytes;
use serde::Serialize;

use crate::{FailureEnvelope, Headers, PutRecord, PutRecordBatch};

/// Message payload
#[derive(Debug, Clone, Serialize)]
pub enum Payload {
    /// Raw bytes, used as record data unchanged
    Bytes(Bytes),

    /// Arbitrary value requiring conversion to bytes
    Value(serde_json::Value),

    /// Pre-built single-record request, dispatched without building
    Single(PutRecord),

    /// Pre-built batch request, dispatched without building
    Batch(PutRecordBatch),

    /// Structured failure carried by error-envelope messages
    Failure(Box<FailureEnvelope>),
}

/// Message envelope: payload + headers
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Opaque payload
    pub payload: Payload,

    /// Named metadata entries
    pub headers: Headers,
}

impl Message {
    /// Create a message from raw bytes
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            payload: Payload::Bytes(data.into()),
            headers: Headers::new(),
        }
    }

    /// Create a message from an arbitrary value needing conversion
    pub fn from_value(value: serde_json::Value) -> Self {
        Self {
            payload: Payload::Value(value),
            headers: Headers::new(),
        }
    }

    /// Create a message carrying a pre-built single-record request
    pub fn from_record(record: PutRecord) -> Self {
        Self {
            payload: Payload::Single(record),
            headers: Headers::new(),
        }
    }

    /// Create a message carrying a pre-built batch request
    pub fn from_batch(batch: PutRecordBatch) -> Self {
        Self {
            payload: Payload::Batch(batch),
            headers: Headers::new(),
        }
    }

    /// Create an error-envelope message from a structured failure
    pub fn from_failure(envelope: FailureEnvelope) -> Self {
        Self {
            payload: Payload::Failure(Box::new(envelope)),
            headers: Headers::new(),
        }
    }

    /// Attach a header, consuming and returning the message
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<crate::HeaderValue>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Text header lookup, empty values treated as absent
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.non_empty_text(key)
    }
}
