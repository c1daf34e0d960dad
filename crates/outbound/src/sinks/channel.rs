//! ChannelSink - buffers messages on an in-process channel

use contracts::{Message, MessageSink, RelayError};
use tokio::sync::mpsc;
use tracing::warn;

/// Sink backed by a bounded tokio channel
///
/// Sends are non-blocking: a full queue rejects the message rather than
/// stalling the completion task.
pub struct ChannelSink {
    name: String,
    tx: mpsc::Sender<Message>,
}

impl ChannelSink {
    /// Create a sink and the receiver draining it
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl MessageSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: Message) -> Result<(), RelayError> {
        match self.tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(sink = %self.name, "Queue full, message dropped");
                Err(RelayError::sink_send(&self.name, "queue full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(RelayError::sink_send(&self.name, "receiver closed"))
            }
        }
    }
}
