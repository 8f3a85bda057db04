//! Observability of the logging engine itself.
//!
//! # Data Flow
//! ```text
//! engine failures (bad config values, sink write errors)
//!     → reporter.rs (tracing events, target "dynlog::reporter")
//! engine activity (records written, level changes, logger count)
//!     → metrics.rs (counters and gauges via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - The engine never logs about itself through its own loggers
//! - Nothing here can fail into the caller
//! - Without an installed recorder or subscriber both are no-ops

pub mod metrics;
pub mod reporter;
