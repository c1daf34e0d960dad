//! Layered error definitions
//!
//! Categorized by source: config / build / sink / remote service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Build Errors =====
    /// Required request field unresolved from headers and configuration
    #[error("missing required field '{field}': {message}")]
    MissingField { field: String, message: String },

    /// Payload cannot be converted to record bytes
    #[error("payload conversion error: {message}")]
    Conversion { message: String },

    // ===== Sink Errors =====
    /// Sink send error
    #[error("sink '{sink_name}' send error: {message}")]
    SinkSend { sink_name: String, message: String },

    /// Named sink could not be resolved
    #[error("no sink registered under name '{name}'")]
    SinkResolution { name: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create missing-field error
    pub fn missing_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create sink send error
    pub fn sink_send(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkSend {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Remote service failure
///
/// Carried inside outcomes and failure envelopes, so it must be `Clone`
/// and serializable; fields are plain strings for that reason.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ProducerError {
    /// Stream throughput exceeded
    #[error("throughput exceeded for stream '{stream}': {message}")]
    Throttled { stream: String, message: String },

    /// Destination stream does not exist
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },

    /// The service rejected the request shape
    #[error("request validation failed: {message}")]
    Validation { message: String },

    /// Internal service error
    #[error("service error: {message}")]
    Service { message: String },

    /// The producer shut down before the dispatch completed
    #[error("dispatch canceled before completion")]
    Canceled,
}

impl ProducerError {
    /// Create throttled error
    pub fn throttled(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Throttled {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create stream-not-found error
    pub fn stream_not_found(stream: impl Into<String>) -> Self {
        Self::StreamNotFound {
            stream: stream.into(),
        }
    }

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}
