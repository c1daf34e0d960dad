//! LogSink - logs message summaries via tracing

use contracts::{header_names, Message, MessageSink, Payload, RelayError};
use tracing::info;

/// Sink that logs message summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn payload_kind(message: &Message) -> &'static str {
        match &message.payload {
            Payload::Bytes(_) => "bytes",
            Payload::Value(_) => "value",
            Payload::Single(_) => "single",
            Payload::Batch(_) => "batch",
            Payload::Failure(_) => "failure",
        }
    }
}

impl MessageSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: Message) -> Result<(), RelayError> {
        info!(
            sink = %self.name,
            payload = Self::payload_kind(&message),
            headers = message.headers.len(),
            shard_id = message.header(header_names::SHARD_ID),
            sequence_number = message.header(header_names::SEQUENCE_NUMBER),
            "Message received"
        );
        Ok(())
    }
}
