//! Human-readable line records.
//!
//! ```text
//! 2024-03-05 10:15:30.250 [worker-1] WARN c.e.Service - retrying in 5s
//! app.Boom: it broke
//! 	at app.Handler.handle(Handler.rs:10)
//! ```

use std::fmt::Write as _;

use crate::encoder::throwable::ThrowableRenderer;
use crate::encoder::timestamp::{TimestampFormat, Zone};
use crate::encoder::RecordEncoder;
use crate::logger::LogEvent;

#[derive(Debug, Clone)]
pub struct PlainEncoder {
    timestamp: TimestampFormat,
    show_thread_name: bool,
    renderer: ThrowableRenderer,
}

impl Default for PlainEncoder {
    fn default() -> Self {
        Self {
            timestamp: TimestampFormat::plain_default(Zone::Local),
            show_thread_name: true,
            renderer: ThrowableRenderer::default(),
        }
    }
}

impl PlainEncoder {
    pub fn new(timestamp: TimestampFormat, show_thread_name: bool, renderer: ThrowableRenderer) -> Self {
        Self {
            timestamp,
            show_thread_name,
            renderer,
        }
    }
}

impl RecordEncoder for PlainEncoder {
    fn encode(&self, event: &LogEvent<'_>) -> Vec<u8> {
        let mut line = String::with_capacity(200);
        line.push_str(&self.timestamp.format(event.timestamp));
        line.push(' ');
        if self.show_thread_name {
            let _ = write!(line, "[{}] ", event.thread_name);
        }
        line.push_str(event.level.as_str());
        line.push(' ');
        line.push_str(event.logger_name);
        line.push_str(" - ");
        line.push_str(&event.message());
        line.push('\n');
        if let Some(error) = event.error {
            line.push_str(&self.renderer.render(error));
        }
        line.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::throwable::{StackFrame, Throwable};
    use crate::level::Level;
    use chrono::{DateTime, Utc};

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-05T10:15:30.250Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn encoder(show_thread_name: bool) -> PlainEncoder {
        PlainEncoder::new(
            TimestampFormat::plain_default(Zone::utc()),
            show_thread_name,
            ThrowableRenderer::default(),
        )
    }

    #[test]
    fn test_single_line() {
        let event = LogEvent::capture("c.e.Service", Level::Warn, "retrying in {}s", &[&5], None)
            .with_timestamp(at())
            .with_thread_name("worker-1");
        let text = String::from_utf8(encoder(true).encode(&event)).unwrap();
        assert_eq!(text, "2024-03-05 10:15:30.250 [worker-1] WARN c.e.Service - retrying in 5s\n");
    }

    #[test]
    fn test_without_thread_name() {
        let event = LogEvent::capture("Service", Level::Info, "up", &[], None)
            .with_timestamp(at())
            .with_thread_name("main");
        let text = String::from_utf8(encoder(false).encode(&event)).unwrap();
        assert_eq!(text, "2024-03-05 10:15:30.250 INFO Service - up\n");
    }

    #[test]
    fn test_trace_follows_main_line() {
        let error = Throwable::new("app.Boom", "it broke")
            .with_frame(StackFrame::new("app.Handler", "handle").at("Handler.rs", 10));
        let event = LogEvent::capture("Service", Level::Error, "failed", &[], Some(&error))
            .with_timestamp(at())
            .with_thread_name("main");
        let text = String::from_utf8(encoder(true).encode(&event)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2024-03-05 10:15:30.250 [main] ERROR Service - failed");
        assert_eq!(lines[1], "app.Boom: it broke");
        assert_eq!(lines[2], "\tat app.Handler.handle(Handler.rs:10)");
    }
}
