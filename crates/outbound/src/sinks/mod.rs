//! Sink implementations
//!
//! Contains LogSink, ChannelSink, and the named SinkRegistry.

mod channel;
mod log;
mod registry;

pub use self::channel::ChannelSink;
pub use self::log::LogSink;
pub use self::registry::SinkRegistry;
