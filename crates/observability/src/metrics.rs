//! Dispatch metric recording
//!
//! Prometheus counters/histograms for the outbound send path, plus an
//! in-memory aggregator for end-of-run summaries.

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// Record a request handed to the producer
pub fn record_dispatch_submitted(stream: &str, record_count: usize, payload_bytes: usize) {
    counter!(
        "stream_relay_dispatches_submitted_total",
        "stream" => stream.to_string()
    )
    .increment(1);
    counter!(
        "stream_relay_records_submitted_total",
        "stream" => stream.to_string()
    )
    .increment(record_count as u64);
    histogram!(
        "stream_relay_request_bytes",
        "stream" => stream.to_string()
    )
    .record(payload_bytes as f64);
}

/// Record a routed dispatch outcome
pub fn record_dispatch_completed(stream: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "stream_relay_dispatches_completed_total",
        "stream" => stream.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the latency of one completed dispatch
pub fn record_dispatch_latency_ms(latency_ms: f64) {
    histogram!("stream_relay_dispatch_latency_ms").record(latency_ms);
}

/// Record a synchronous wait that expired
pub fn record_send_timeout(stream: &str) {
    counter!(
        "stream_relay_send_timeouts_total",
        "stream" => stream.to_string()
    )
    .increment(1);
}

/// Record a failure envelope delivered to a failure sink
pub fn record_failure_routed(sink: &str) {
    counter!(
        "stream_relay_failures_routed_total",
        "sink" => sink.to_string()
    )
    .increment(1);
    gauge!("stream_relay_last_failure_routed", "sink" => sink.to_string()).set(1.0);
}

/// Dispatch statistics aggregator
///
/// Aggregates counters in memory for summary output at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// Total dispatches submitted
    pub submitted: u64,

    /// Dispatches acked by the service
    pub succeeded: u64,

    /// Dispatches the service rejected
    pub failed: u64,

    /// Synchronous waits that expired
    pub timed_out: u64,

    /// Messages rejected before dispatch
    pub build_errors: u64,

    /// Latency statistics (ms)
    pub latency_ms: RunningStats,

    /// Request size statistics (bytes)
    pub request_bytes: RunningStats,

    /// Per-stream dispatch counts
    pub stream_counts: HashMap<String, u64>,
}

impl DispatchStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one submission
    pub fn record_submitted(&mut self, stream: &str, payload_bytes: usize) {
        self.submitted += 1;
        self.request_bytes.push(payload_bytes as f64);
        *self.stream_counts.entry(stream.to_string()).or_insert(0) += 1;
    }

    /// Record one completion
    pub fn record_completed(&mut self, success: bool, latency_ms: f64) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.latency_ms.push(latency_ms);
    }

    /// Record one expired synchronous wait
    pub fn record_timed_out(&mut self) {
        self.timed_out += 1;
    }

    /// Record one build-time rejection
    pub fn record_build_error(&mut self) {
        self.build_errors += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> SummaryReport {
        SummaryReport {
            submitted: self.submitted,
            succeeded: self.succeeded,
            failed: self.failed,
            timed_out: self.timed_out,
            build_errors: self.build_errors,
            success_rate: if self.submitted > 0 {
                self.succeeded as f64 / self.submitted as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_ms),
            request_bytes: StatsSummary::from(&self.request_bytes),
            stream_counts: self.stream_counts.clone(),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report
#[derive(Debug, Clone, Default)]
pub struct SummaryReport {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub build_errors: u64,
    pub success_rate: f64,
    pub latency_ms: StatsSummary,
    pub request_bytes: StatsSummary,
    pub stream_counts: HashMap<String, u64>,
}

impl std::fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Submitted: {}", self.submitted)?;
        writeln!(
            f,
            "Succeeded: {} ({:.2}%)",
            self.succeeded, self.success_rate
        )?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Timed out: {}", self.timed_out)?;
        writeln!(f, "Build errors: {}", self.build_errors)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Request size (bytes): {}", self.request_bytes)?;

        if !self.stream_counts.is_empty() {
            writeln!(f, "Dispatches per stream:")?;
            for (stream, count) in &self.stream_counts {
                writeln!(f, "  {}: {}", stream, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Push a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
