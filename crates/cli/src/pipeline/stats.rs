//! Run statistics.

use std::collections::HashMap;
use std::time::Duration;

use observability::DispatchStatsAggregator;

/// Statistics from a relay run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Dispatch statistics aggregator
    pub dispatch: DispatchStatsAggregator,

    /// Total duration of the run
    pub duration: Duration,

    /// Records the loopback producer accepted
    pub records_accepted: u64,

    /// Messages delivered per sink
    pub delivered_by_sink: HashMap<String, u64>,
}

impl RunStats {
    /// Sends per second throughput
    pub fn sends_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.submitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print a human-readable summary
    pub fn print_summary(&self) {
        println!("\n{}", self.dispatch.summary());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Throughput: {:.2} sends/s", self.sends_per_sec());
        println!("Records accepted by producer: {}", self.records_accepted);

        if !self.delivered_by_sink.is_empty() {
            println!("Delivered per sink:");
            for (sink, count) in &self.delivered_by_sink {
                println!("  {}: {}", sink, count);
            }
        }
    }
}
