//! Configuration schema definitions.
//!
//! All types derive Serde traits so settings can come from a TOML document
//! as well as from the flat property snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::encoder::throwable::DEFAULT_MAX_LENGTH;

/// Root configuration for a logger context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// Level for names with no matching assignment (default: info).
    pub default_level: String,

    /// Initial `name-or-prefix -> level` assignments.
    pub levels: HashMap<String, String>,

    /// Record format.
    pub format: WriterKind,

    /// `full`, `short` or an integer target length.
    pub name_target_length: String,

    /// Named ISO pattern or strftime pattern. Variant default when unset.
    pub timestamp_pattern: Option<String>,

    /// Zone identifier; unset or `[DEFAULT]` means the local zone.
    pub timezone: Option<String>,

    pub component: Option<String>,

    pub environment: Option<String>,

    /// JSON object whose members are added to every JSON record.
    pub custom_fields: Option<String>,

    /// Plain format only.
    pub show_thread_name: bool,

    /// JSON format only.
    pub include_stack_hash: bool,

    /// Field renames such as `logger=name,thread=t`.
    pub property_names: Option<String>,

    /// Upper bound on rendered error traces, in bytes.
    pub max_throwable_length: usize,

    /// Frames written per error in a chain. Unbounded when unset.
    pub max_depth_per_throwable: Option<usize>,

    pub root_cause_first: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            levels: HashMap::new(),
            format: WriterKind::Json,
            name_target_length: "full".to_string(),
            timestamp_pattern: None,
            timezone: None,
            component: None,
            environment: None,
            custom_fields: None,
            show_thread_name: true,
            include_stack_hash: true,
            property_names: None,
            max_throwable_length: DEFAULT_MAX_LENGTH,
            max_depth_per_throwable: None,
            root_cause_first: false,
        }
    }
}

/// Record encoder selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterKind {
    #[default]
    Json,
    Plain,
}

impl WriterKind {
    /// `plain` (any case) selects plain text; anything else is JSON.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("plain") {
            WriterKind::Plain
        } else {
            WriterKind::Json
        }
    }
}
