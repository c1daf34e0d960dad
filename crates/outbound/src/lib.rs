//! # Outbound
//!
//! The outbound put-record adapter.
//!
//! Responsibilities:
//! - Build well-formed put requests from pipeline messages (header-first
//!   field resolution, converter fallback for value payloads)
//! - Dispatch requests through a [`producer::StreamProducer`] without
//!   blocking the caller, with optional bounded synchronous wait
//! - Route each dispatch outcome back into the pipeline: enriched success
//!   messages to the output sink, typed failure envelopes to the failure sink

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod router;
pub mod sinks;

pub use adapter::PutAdapter;
pub use config::{AdapterConfig, FailureSinkRef, PutAdapterBuilder, DEFAULT_SEND_TIMEOUT_MS};
pub use contracts::{DispatchOutcome, Message, OutboundRequest, ProduceAck};
pub use error::DispatchError;
pub use handle::DispatchHandle;
pub use metrics::{AdapterMetrics, MetricsSnapshot};
pub use sinks::{ChannelSink, LogSink, SinkRegistry};
