//! DispatchHandle - caller-side view of one in-flight dispatch

use std::time::Duration;

use contracts::{Message, ProduceAck, ProducerError};
use tokio::sync::oneshot;

use crate::error::DispatchError;

/// Handle to one dispatched request
///
/// Resolves exactly once, after the result router has finished routing the
/// outcome. Dropping the handle detaches the caller; the dispatch and its
/// routing continue unaffected.
pub struct DispatchHandle {
    rx: oneshot::Receiver<Result<ProduceAck, ProducerError>>,
    original: Message,
}

impl DispatchHandle {
    pub(crate) fn new(
        rx: oneshot::Receiver<Result<ProduceAck, ProducerError>>,
        original: Message,
    ) -> Self {
        Self { rx, original }
    }

    /// The message this dispatch was built from
    pub fn original(&self) -> &Message {
        &self.original
    }

    /// Wait indefinitely for the routed outcome
    ///
    /// # Errors
    /// - [`DispatchError::Remote`] when the service rejected the request,
    ///   or when the adapter shut down before completion
    pub async fn wait(self) -> Result<ProduceAck, DispatchError> {
        match self.rx.await {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(cause)) => Err(DispatchError::Remote(cause)),
            // Completion task dropped without resolving
            Err(_) => Err(DispatchError::Remote(ProducerError::Canceled)),
        }
    }

    /// Wait for the routed outcome, bounded by `timeout`
    ///
    /// Expiry does not cancel the dispatch; the outcome is still routed.
    ///
    /// # Errors
    /// - [`DispatchError::SendTimeout`] on expiry, carrying the original
    ///   message
    /// - [`DispatchError::Remote`] when the service rejected the request
    pub async fn wait_timeout(self, timeout: Duration) -> Result<ProduceAck, DispatchError> {
        let timeout_ms = timeout.as_millis() as u64;
        let original = self.original.clone();
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::SendTimeout {
                timeout_ms,
                message: Box::new(original),
            }),
        }
    }
}
