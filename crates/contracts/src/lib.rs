//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Message Model
//! - A `Message` is an opaque envelope: payload + named headers
//! - Well-known header keys live in [`header_names`] and are stable across versions

mod blueprint;
mod error;
mod headers;
mod message;
mod observer;
mod outcome;
mod request;
mod sink;
mod value_source;

pub use blueprint::*;
pub use error::*;
pub use headers::{HeaderValue, Headers};
pub use message::*;
pub use observer::*;
pub use outcome::*;
pub use request::*;
pub use sink::*;
pub use value_source::ValueSource;

pub mod header_names {
    //! Well-known header keys recognized by the adapter.
    //!
    //! Names are adapter-defined constants, stable across versions.

    /// Destination stream name.
    pub const STREAM: &str = "stream";

    /// Shard routing key supplied by the caller.
    pub const PARTITION_KEY: &str = "partition-key";

    /// Optional hash override bypassing partition-key-derived routing.
    pub const EXPLICIT_HASH_KEY: &str = "explicit-hash-key";

    /// Ordering token; also set on success messages from the record ack.
    pub const SEQUENCE_NUMBER: &str = "sequence-number";

    /// Shard that accepted the record, set on success messages.
    pub const SHARD_ID: &str = "shard-id";

    /// Raw service result for batch and other non-record acks.
    pub const SERVICE_RESULT: &str = "service-result";
}
