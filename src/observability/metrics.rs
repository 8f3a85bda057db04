//! Engine metrics.
//!
//! # Metrics
//! - `dynlog_records_written_total` (counter): records written to the sink
//! - `dynlog_write_failures_total` (counter): records lost to sink errors
//! - `dynlog_level_changes_total` (counter): logger levels changed by batch updates
//! - `dynlog_loggers` (gauge): distinct loggers created

use metrics::{counter, gauge};

pub fn record_written() {
    counter!("dynlog_records_written_total").increment(1);
}

pub fn record_write_failure() {
    counter!("dynlog_write_failures_total").increment(1);
}

pub fn record_level_changes(count: usize) {
    counter!("dynlog_level_changes_total").increment(count as u64);
}

pub fn record_logger_count(count: usize) {
    gauge!("dynlog_loggers").set(count as f64);
}
