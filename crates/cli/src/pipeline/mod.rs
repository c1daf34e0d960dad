//! Relay driver and run statistics.

mod driver;
mod stats;

pub use driver::{DriverConfig, RelayDriver};
pub use stats::RunStats;
