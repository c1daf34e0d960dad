//! Adapter error types

use contracts::{Message, ProducerError, RelayError};
use thiserror::Error;

/// Errors surfaced to the adapter's caller
///
/// Build-time errors (`Configuration`, `Conversion`) are raised before any
/// dispatch and never reach the failure sink. `SendTimeout` and `Remote`
/// are only ever observed by synchronous callers; in asynchronous mode the
/// result router is the sole consumer of dispatch failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Required request field unresolved from headers and configuration
    #[error("cannot resolve '{field}' for put request: {message}")]
    Configuration { field: String, message: String },

    /// Payload could not be converted to record bytes
    #[error("payload conversion failed: {message}")]
    Conversion { message: String },

    /// Synchronous wait exceeded the configured bound
    ///
    /// Carries the original message; the underlying dispatch continues and
    /// its outcome is still routed.
    #[error("timed out after {timeout_ms}ms waiting for dispatch completion")]
    SendTimeout {
        timeout_ms: u64,
        message: Box<Message>,
    },

    /// The remote service reported an error
    #[error("remote dispatch failed: {0}")]
    Remote(#[from] ProducerError),

    /// Contract-level error
    #[error(transparent)]
    Contract(#[from] RelayError),
}

impl DispatchError {
    /// Create a configuration error for an unresolvable field
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }
}
