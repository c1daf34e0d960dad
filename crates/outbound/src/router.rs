//! Result router
//!
//! The completion continuation of one dispatch: invoked exactly once per
//! request, on the completion task (or inline when the producer fails before
//! any await point). Success outcomes become enriched output messages;
//! failure outcomes become typed failure envelopes. Sink errors are logged
//! and counted, never panic the completion task.

use std::sync::Arc;

use contracts::{
    header_names, DispatchOutcome, FailureEnvelope, Message, OutboundRequest, ProduceAck,
    ProducerError,
};
use tracing::{debug, error, warn};

use crate::config::AdapterConfig;
use crate::metrics::AdapterMetrics;

pub(crate) struct ResultRouter {
    config: Arc<AdapterConfig>,
    metrics: Arc<AdapterMetrics>,
}

impl ResultRouter {
    pub(crate) fn new(config: Arc<AdapterConfig>, metrics: Arc<AdapterMetrics>) -> Self {
        Self { config, metrics }
    }

    /// Route one terminal outcome
    pub(crate) fn route(&self, original: &Message, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Success { request, ack } => {
                self.metrics.inc_succeeded();
                self.on_success(original, &request, &ack);
            }
            DispatchOutcome::Failure { request, cause } => {
                self.metrics.inc_failed();
                self.on_failure(original, request, cause);
            }
        }
    }

    fn on_success(&self, original: &Message, request: &OutboundRequest, ack: &ProduceAck) {
        if let Some(observer) = &self.config.observer {
            observer.on_success(original, request, ack);
        }

        let Some(output_sink) = &self.config.output_sink else {
            // Outcome observed only; not an error.
            debug!(stream = request.stream(), "Dispatch succeeded, no output sink configured");
            return;
        };

        let enriched = build_success_message(original, ack);
        if let Err(e) = output_sink.send(enriched) {
            error!(
                sink = output_sink.name(),
                stream = request.stream(),
                error = %e,
                "Failed to deliver success message"
            );
        }
    }

    fn on_failure(&self, original: &Message, request: OutboundRequest, cause: ProducerError) {
        if let Some(observer) = &self.config.observer {
            observer.on_failure(original, &request, &cause);
        }

        let Some(failure_sink_ref) = &self.config.failure_sink else {
            // Synchronous callers still observe the failure via the handle;
            // in asynchronous mode this drop is the documented contract.
            warn!(
                stream = request.stream(),
                cause = %cause,
                "Dispatch failed with no failure sink configured, dropping"
            );
            self.metrics.inc_failures_dropped();
            return;
        };

        let failure_sink = match failure_sink_ref.resolve() {
            Ok(sink) => sink,
            Err(e) => {
                error!(error = %e, "Failed to resolve failure sink, dropping failure");
                self.metrics.inc_failures_dropped();
                return;
            }
        };

        let envelope = FailureEnvelope {
            original: original.clone(),
            request,
            cause,
        };
        if let Err(e) = failure_sink.send(Message::from_failure(envelope)) {
            error!(
                sink = failure_sink.name(),
                error = %e,
                "Failed to deliver failure envelope"
            );
            self.metrics.inc_failures_dropped();
        }
    }
}

/// Derive the outbound success message from the original
///
/// The original payload and unrelated headers are preserved; result
/// metadata is merged in. Record acks set `shard-id` and `sequence-number`;
/// batch acks set a single `service-result` JSON header.
fn build_success_message(original: &Message, ack: &ProduceAck) -> Message {
    let mut enriched = original.clone();
    match ack {
        ProduceAck::Record(record_ack) => {
            enriched
                .headers
                .insert(header_names::SHARD_ID, record_ack.shard_id.as_str());
            enriched.headers.insert(
                header_names::SEQUENCE_NUMBER,
                record_ack.sequence_number.as_str(),
            );
        }
        ProduceAck::Batch(batch_ack) => {
            let raw = serde_json::to_value(batch_ack).unwrap_or_else(|_| serde_json::Value::Null);
            enriched.headers.insert(header_names::SERVICE_RESULT, raw);
        }
    }
    enriched
}
