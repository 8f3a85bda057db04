//! Log levels and hierarchical level resolution.
//!
//! # Data Flow
//! ```text
//! initial config (log.level.*)      runtime batch update
//!     → registry.rs (store)             → coordinator.rs (parse, store)
//!                                        → walk LoggerCache
//!                                        → atomic per-logger level swap
//! logger creation
//!     → registry.rs (resolve: exact name, then shorter dot prefixes, then default)
//! ```
//!
//! # Design Decisions
//! - Levels are a `repr(u8)` enum so a logger's level fits in one atomic
//! - Unknown level strings fall back to INFO instead of failing
//! - Assignments are only ever overwritten, never removed

pub mod coordinator;
pub mod registry;

pub use coordinator::LevelCoordinator;
pub use registry::LevelRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered severity. An event is emitted when its level is at or above the
/// logger's effective level.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl Level {
    /// Parse a level name case-insensitively.
    ///
    /// Recognized tokens are `trace`, `debug`, `info`, `warn`, `error` and `off`.
    /// Anything else resolves to [`Level::Info`].
    pub fn parse_lenient(value: &str) -> Level {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            "off" => Level::Off,
            other => {
                tracing::debug!(value = other, "Unrecognized log level, using info");
                Level::Info
            }
        }
    }

    /// Upper-case name as rendered in log records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// Lower-case name, the form used in configuration.
    pub fn as_config_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl From<u8> for Level {
    fn from(val: u8) -> Self {
        match val {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
