//! A single log call, captured for encoding.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::encoder::message::format_message;
use crate::encoder::throwable::Throwable;
use crate::level::Level;
use crate::logger::mdc;

/// Everything an encoder needs to render one record. Borrowed from the call
/// site and dropped once the record is written.
pub struct LogEvent<'a> {
    /// Display (abbreviated) logger name.
    pub logger_name: &'a str,
    pub level: Level,
    pub template: &'a str,
    pub args: &'a [&'a dyn fmt::Display],
    pub error: Option<&'a Throwable>,
    pub timestamp: DateTime<Utc>,
    pub thread_name: String,
    /// Ambient key/values, in key order.
    pub context: Vec<(String, String)>,
}

impl<'a> LogEvent<'a> {
    /// Capture time, thread name and ambient context from the calling thread.
    pub fn capture(
        logger_name: &'a str,
        level: Level,
        template: &'a str,
        args: &'a [&'a dyn fmt::Display],
        error: Option<&'a Throwable>,
    ) -> Self {
        Self {
            logger_name,
            level,
            template,
            args,
            error,
            timestamp: Utc::now(),
            thread_name: current_thread_name(),
            context: mdc::snapshot(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Template with positional arguments substituted.
    pub fn message(&self) -> String {
        format_message(self.template, self.args)
    }
}

impl fmt::Debug for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("logger_name", &self.logger_name)
            .field("level", &self.level)
            .field("message", &self.message())
            .field("error", &self.error.is_some())
            .field("thread_name", &self.thread_name)
            .finish()
    }
}

fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", thread.id()),
    }
}
