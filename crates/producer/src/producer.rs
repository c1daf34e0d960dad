//! Stream producer abstraction
//!
//! Defines the trait for the remote ingestion client, supporting real
//! implementations and mock testing behind one interface.

use std::future::Future;
use std::pin::Pin;

use contracts::{ProduceAck, ProducerError, PutRecord, PutRecordBatch};

/// Completion future of one submission
///
/// Resolves exactly once: either the service ack or the remote failure.
/// Dropping the future does not cancel the underlying call of a real client.
pub type ProduceFuture = Pin<Box<dyn Future<Output = Result<ProduceAck, ProducerError>> + Send>>;

/// Remote stream-ingestion client
///
/// Submissions return immediately with a completion future; the client owns
/// whatever concurrency executes the call. The adapter never blocks inside
/// these methods.
pub trait StreamProducer: Send + Sync {
    /// Submit a single-record put
    fn put_record(&self, request: PutRecord) -> ProduceFuture;

    /// Submit a batch put
    fn put_record_batch(&self, request: PutRecordBatch) -> ProduceFuture;
}
