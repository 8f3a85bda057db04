//! Writes encoded records to a byte sink.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::encoder::{LogWriter, RecordEncoder};
use crate::logger::LogEvent;
use crate::observability::{metrics, reporter};

/// Encodes events and writes each record with exclusive access to the sink.
///
/// Write failures are reported on the side channel and swallowed; the log
/// call that triggered them returns normally.
pub struct SinkWriter {
    encoder: Box<dyn RecordEncoder>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl SinkWriter {
    pub fn new(encoder: Box<dyn RecordEncoder>, sink: Box<dyn Write + Send>) -> Self {
        Self {
            encoder,
            sink: Mutex::new(sink),
        }
    }

    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        // a panicking writer leaves no partial state we depend on
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(record)?;
        sink.flush()
    }
}

impl std::fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkWriter").finish_non_exhaustive()
    }
}

impl LogWriter for SinkWriter {
    fn log(&self, event: &LogEvent<'_>) {
        let record = self.encoder.encode(event);
        if record.is_empty() {
            return;
        }
        match self.write_record(&record) {
            Ok(()) => metrics::record_written(),
            Err(e) => {
                metrics::record_write_failure();
                reporter::report_write_failure(event.logger_name, &e);
            }
        }
    }
}
