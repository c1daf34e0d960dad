//! MessageSink trait - outbound message destinations
//!
//! Defines the abstract interface the adapter routes success and failure
//! messages to. Sends are non-blocking handoffs (in-process channels), so
//! the trait is synchronous and object-safe; the result router calls it
//! from the completion task.

use std::fmt;
use std::sync::Arc;

use crate::{Message, RelayError};

/// Outbound message destination
pub trait MessageSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Hand a message to this sink
    ///
    /// # Errors
    /// Returns a send error when the sink rejected or dropped the message
    fn send(&self, message: Message) -> Result<(), RelayError>;
}

impl fmt::Debug for dyn MessageSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSink")
            .field("name", &self.name())
            .finish()
    }
}

/// Deferred sink lookup by name
///
/// The adapter resolves a named failure sink lazily on first use; resolution
/// must be deterministic and side-effect-free so a concurrent double
/// resolution is harmless.
pub trait SinkResolver: Send + Sync {
    /// Resolve a sink reference by name
    ///
    /// # Errors
    /// Returns [`RelayError::SinkResolution`] when no sink is registered
    /// under `name`
    fn resolve(&self, name: &str) -> Result<Arc<dyn MessageSink>, RelayError>;
}
