//! Dispatch outcome
//!
//! Produced exactly once per dispatched request, on the completion task.

use serde::Serialize;

use crate::{Message, OutboundRequest, ProduceAck, ProducerError};

/// Terminal result of one dispatch
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The service accepted the request
    Success {
        /// The dispatched request
        request: OutboundRequest,
        /// Service ack
        ack: ProduceAck,
    },

    /// The service reported an error
    Failure {
        /// The dispatched request
        request: OutboundRequest,
        /// Remote cause
        cause: ProducerError,
    },
}

impl DispatchOutcome {
    /// The request this outcome belongs to
    pub fn request(&self) -> &OutboundRequest {
        match self {
            Self::Success { request, .. } | Self::Failure { request, .. } => request,
        }
    }

    /// Whether the dispatch succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Structured failure routed to the failure sink
///
/// Wraps everything a downstream consumer needs to retry or alert: the
/// original message, the request that failed, and the remote cause.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    /// The message that triggered the dispatch
    pub original: Message,

    /// The request the service rejected
    pub request: OutboundRequest,

    /// Remote cause
    pub cause: ProducerError,
}
