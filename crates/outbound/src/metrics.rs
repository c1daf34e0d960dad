//! Adapter metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single adapter instance
#[derive(Debug, Default)]
pub struct AdapterMetrics {
    /// Requests handed to the producer
    submitted: AtomicU64,
    /// Dispatches acked by the service
    succeeded: AtomicU64,
    /// Dispatches the service rejected
    failed: AtomicU64,
    /// Synchronous waits that expired
    timed_out: AtomicU64,
    /// Messages rejected before dispatch
    build_errors: AtomicU64,
    /// Failure envelopes that could not be delivered to a failure sink
    failures_dropped: AtomicU64,
}

impl AdapterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get submitted count
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Increment submitted count
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get succeeded count
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Increment succeeded count
    pub fn inc_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failed count
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Increment failed count
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get timed-out count
    pub fn timed_out(&self) -> u64 {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Increment timed-out count
    pub fn inc_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Get build-error count
    pub fn build_errors(&self) -> u64 {
        self.build_errors.load(Ordering::Relaxed)
    }

    /// Increment build-error count
    pub fn inc_build_errors(&self) {
        self.build_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped-failure count
    pub fn failures_dropped(&self) -> u64 {
        self.failures_dropped.load(Ordering::Relaxed)
    }

    /// Increment dropped-failure count
    pub fn inc_failures_dropped(&self) {
        self.failures_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            timed_out: self.timed_out(),
            build_errors: self.build_errors(),
            failures_dropped: self.failures_dropped(),
        }
    }
}

/// Snapshot of adapter counters (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub build_errors: u64,
    pub failures_dropped: u64,
}
