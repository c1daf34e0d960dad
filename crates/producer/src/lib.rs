//! # Producer
//!
//! The remote-collaborator seam: the client that actually performs
//! stream-ingestion calls.
//!
//! Responsibilities:
//! - Define the [`StreamProducer`] trait the adapter dispatches through
//! - Provide a [`MockStreamProducer`] for unit tests (injectable failures,
//!   manual completion)
//! - Provide a [`LoopbackProducer`] with in-memory shards for the demo CLI
//!
//! Retry, backoff, connection pooling, and protocol framing belong to a real
//! client implementation behind the same trait, not to this workspace.

mod loopback;
mod mock;
mod producer;

pub use loopback::LoopbackProducer;
pub use mock::{CompletionHandle, MockProducerConfig, MockStreamProducer};
pub use producer::{ProduceFuture, StreamProducer};
