//! Request builder
//!
//! Maps an inbound message onto a single-record put request. Pure with
//! respect to shared state: reads the message and the frozen configuration,
//! allocates a new request.
//!
//! Field resolution order, first non-empty wins:
//! 1. the message's well-known header
//! 2. the configured value source
//!
//! Stream and partition key are required; their absence is a configuration
//! error raised before any dispatch. Explicit hash key and sequence number
//! are optional.

use bytes::Bytes;
use contracts::{header_names, Message, Payload, PutRecord, RelayError};

use crate::config::AdapterConfig;
use crate::error::DispatchError;

/// Build a single-record put request from a message
///
/// Callers must not pass messages whose payload is already a pre-built
/// request; those bypass the builder entirely.
///
/// # Errors
/// - [`DispatchError::Configuration`] when stream or partition key cannot
///   be resolved from either the message headers or the configuration
/// - [`DispatchError::Conversion`] when the payload cannot be serialized
pub fn build_put_record(
    message: &Message,
    config: &AdapterConfig,
) -> Result<PutRecord, DispatchError> {
    let stream = resolve_required(message, header_names::STREAM, &config.stream, "stream")?;
    let partition_key = resolve_required(
        message,
        header_names::PARTITION_KEY,
        &config.partition_key,
        "partition_key",
    )?;

    let explicit_hash_key = resolve_optional(
        message,
        header_names::EXPLICIT_HASH_KEY,
        &config.explicit_hash_key,
    );
    let sequence_number_for_ordering = resolve_optional(
        message,
        header_names::SEQUENCE_NUMBER,
        &config.sequence_number,
    );

    let data = payload_bytes(message, config)?;

    Ok(PutRecord {
        stream,
        partition_key,
        explicit_hash_key,
        sequence_number_for_ordering,
        data,
    })
}

fn resolve_required(
    message: &Message,
    header: &str,
    source: &Option<contracts::ValueSource<String>>,
    field: &str,
) -> Result<String, DispatchError> {
    resolve_optional(message, header, source).ok_or_else(|| {
        DispatchError::configuration(
            field,
            format!(
                "configure the adapter with a literal or computed '{field}' \
                 or supply a '{header}' message header"
            ),
        )
    })
}

fn resolve_optional(
    message: &Message,
    header: &str,
    source: &Option<contracts::ValueSource<String>>,
) -> Option<String> {
    message
        .header(header)
        .map(str::to_string)
        .or_else(|| {
            source
                .as_ref()
                .and_then(|s| s.resolve(message))
                .filter(|v| !v.is_empty())
        })
}

fn payload_bytes(message: &Message, config: &AdapterConfig) -> Result<Bytes, DispatchError> {
    match &message.payload {
        Payload::Bytes(data) => Ok(data.clone()),
        Payload::Value(value) => config.converter.convert(value).map_err(|e| match e {
            RelayError::Conversion { message } => DispatchError::conversion(message),
            other => DispatchError::Contract(other),
        }),
        Payload::Single(_) | Payload::Batch(_) => Err(DispatchError::configuration(
            "payload",
            "pre-built requests bypass the request builder",
        )),
        Payload::Failure(_) => Err(DispatchError::configuration(
            "payload",
            "failure envelopes cannot be dispatched",
        )),
    }
}
