//! Completion observer and payload converter traits

use bytes::Bytes;

use crate::{Message, OutboundRequest, ProduceAck, ProducerError, RelayError};

/// User-supplied hook invoked on every dispatch outcome
///
/// Both hooks run before sink routing, on the completion task. Default
/// implementations do nothing, so observers implement only the hook they
/// care about.
pub trait CompletionObserver: Send + Sync {
    /// Called once when the service accepted the request
    fn on_success(&self, message: &Message, request: &OutboundRequest, ack: &ProduceAck) {
        let _ = (message, request, ack);
    }

    /// Called once when the service reported an error
    fn on_failure(&self, message: &Message, request: &OutboundRequest, cause: &ProducerError) {
        let _ = (message, request, cause);
    }
}

/// Serializes arbitrary payload values to record bytes
pub trait PayloadConverter: Send + Sync {
    /// Convert a payload value to bytes
    ///
    /// # Errors
    /// Returns [`RelayError::Conversion`] for payloads that cannot be
    /// serialized
    fn convert(&self, value: &serde_json::Value) -> Result<Bytes, RelayError>;
}

/// Default converter: JSON serialization
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl PayloadConverter for JsonConverter {
    fn convert(&self, value: &serde_json::Value) -> Result<Bytes, RelayError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| RelayError::conversion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_converter_round_trip() {
        let value = serde_json::json!({"id": 7, "kind": "order"});
        let bytes = JsonConverter.convert(&value).unwrap();
        let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, value);
    }
}
