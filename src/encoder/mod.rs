//! Record encoding and sink writing.
//!
//! # Data Flow
//! ```text
//! LogEvent
//!     → message.rs (substitute {} placeholders)
//!     → throwable.rs (render error chain, bounded)  → stack_hash.rs (optional)
//!     → json.rs | plain.rs (one record as bytes)
//!     → writer.rs (exclusive sink access for the whole record)
//!     → sink (stdout in production)
//! ```
//!
//! # Design Decisions
//! - Encoding runs outside the sink lock; only the write is serialized
//! - A record is written with a single `write_all`, so multi-line records
//!   never interleave with records from other threads
//! - The encoder variant is chosen once when the context is built

pub mod abbreviator;
pub mod json;
pub mod message;
pub mod plain;
pub mod stack_hash;
pub mod throwable;
pub mod timestamp;
pub mod writer;

pub use abbreviator::{AbbreviationPolicy, Abbreviator};
pub use json::{JsonEncoder, PropertyNames};
pub use plain::PlainEncoder;
pub use throwable::{StackFrame, Throwable, ThrowableRenderer};
pub use writer::SinkWriter;

use crate::logger::LogEvent;

/// Renders one event to the bytes of one record.
pub trait RecordEncoder: Send + Sync {
    fn encode(&self, event: &LogEvent<'_>) -> Vec<u8>;
}

/// Receives enabled events from loggers. Must never fail into the caller.
pub trait LogWriter: Send + Sync {
    fn log(&self, event: &LogEvent<'_>);
}
