//! A named logger with a runtime-mutable level.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::encoder::throwable::Throwable;
use crate::encoder::LogWriter;
use crate::level::Level;
use crate::logger::LogEvent;

/// Created once per distinct name and shared for the life of its context.
///
/// The level is the only mutable state. It is read without locking on every
/// log call and replaced in place by batch updates.
pub struct Logger {
    name: String,
    short_name: String,
    level: AtomicU8,
    writer: Arc<dyn LogWriter>,
}

impl Logger {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>, level: Level, writer: Arc<dyn LogWriter>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            level: AtomicU8::new(level as u8),
            writer,
        }
    }

    /// Full dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Abbreviated display name written into records.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Current effective level.
    pub fn level(&self) -> Level {
        Level::from(self.level.load(Ordering::Acquire))
    }

    /// Replace the level. Returns true if it differed from the previous one.
    pub fn set_level(&self, level: Level) -> bool {
        self.level.swap(level as u8, Ordering::AcqRel) != level as u8
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::Off && level >= self.level()
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.is_enabled(Level::Trace)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled(Level::Debug)
    }

    pub fn is_info_enabled(&self) -> bool {
        self.is_enabled(Level::Info)
    }

    pub fn is_warn_enabled(&self) -> bool {
        self.is_enabled(Level::Warn)
    }

    pub fn is_error_enabled(&self) -> bool {
        self.is_enabled(Level::Error)
    }

    /// Emit a record if `level` is enabled.
    pub fn log(&self, level: Level, template: &str, args: &[&dyn fmt::Display], error: Option<&Throwable>) {
        if !self.is_enabled(level) {
            return;
        }
        let event = LogEvent::capture(&self.short_name, level, template, args, error);
        self.writer.log(&event);
    }

    pub fn trace(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Trace, template, args, None);
    }

    pub fn debug(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Debug, template, args, None);
    }

    pub fn info(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Info, template, args, None);
    }

    pub fn warn(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Warn, template, args, None);
    }

    pub fn error(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Error, template, args, None);
    }

    /// Emit an ERROR record carrying a rendered error chain.
    pub fn error_with(&self, template: &str, args: &[&dyn fmt::Display], error: &Throwable) {
        self.log(Level::Error, template, args, Some(error));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("level", &self.level())
            .finish()
    }
}
