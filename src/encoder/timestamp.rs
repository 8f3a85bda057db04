//! Timestamp patterns and time zone parsing.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Keyword selecting the process-local time zone.
pub const DEFAULT_TIMEZONE_KEYWORD: &str = "[DEFAULT]";

const ISO_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
const ISO_LOCAL: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const ISO_INSTANT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const PLAIN_DEFAULT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time zone '{0}'")]
pub struct InvalidTimeZone(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp pattern '{0}'")]
pub struct InvalidPattern(pub String);

/// Zone used to render timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Local,
    Fixed(FixedOffset),
    /// IANA zone such as `Europe/London`, following its daylight-saving rules.
    Named(Tz),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Parse a zone identifier.
    ///
    /// Accepts blank or `[DEFAULT]` (local zone), `UTC`, `GMT`, `Z`, offsets
    /// written as `GMT+10`, `UTC-05:30`, `+02:00` or `-0800`, and IANA zone
    /// names such as `America/Los_Angeles`.
    pub fn parse(value: Option<&str>) -> Result<Zone, InvalidTimeZone> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Zone::Local);
        };
        if raw.eq_ignore_ascii_case(DEFAULT_TIMEZONE_KEYWORD) {
            return Ok(Zone::Local);
        }
        let upper = raw.to_ascii_uppercase();
        let offset = match upper.as_str() {
            "UTC" | "GMT" | "Z" => Some(""),
            other => other
                .strip_prefix("GMT")
                .or_else(|| other.strip_prefix("UTC"))
                .or(Some(other))
                .filter(|rest| rest.starts_with('+') || rest.starts_with('-')),
        };
        if let Some(fixed) = offset.and_then(parse_offset) {
            return Ok(Zone::Fixed(fixed));
        }
        raw.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| InvalidTimeZone(raw.to_owned()))
    }

    fn label(&self) -> String {
        match self {
            Zone::Local => "Local".to_owned(),
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_owned(),
            Zone::Fixed(offset) => format!("UTC{}", offset),
            Zone::Named(tz) => tz.name().to_owned(),
        }
    }
}

/// `""` is UTC; otherwise `±H`, `±HH`, `±HH:MM` or `±HHMM`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.is_empty() {
        return FixedOffset::east_opt(0);
    }
    let (sign, digits) = match text.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    IsoOffset,
    IsoZoned,
    IsoLocal,
    IsoInstant,
    Custom(String),
}

/// Formats record timestamps in a configured zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: Pattern,
    zone: Zone,
}

impl TimestampFormat {
    /// Default for JSON records: ISO-8601 with offset.
    pub fn json_default(zone: Zone) -> Self {
        Self { pattern: Pattern::IsoOffset, zone }
    }

    /// Default for plain records: `2024-01-31 13:45:10.123`.
    pub fn plain_default(zone: Zone) -> Self {
        Self {
            pattern: Pattern::Custom(PLAIN_DEFAULT.to_owned()),
            zone,
        }
    }

    /// Parse a named ISO pattern (case-insensitive) or a strftime pattern.
    pub fn parse(pattern: &str, zone: Zone) -> Result<Self, InvalidPattern> {
        let named = match pattern.trim().to_ascii_uppercase().as_str() {
            "ISO_OFFSET_DATE_TIME" => Some(Pattern::IsoOffset),
            "ISO_ZONED_DATE_TIME" | "ISO_DATE_TIME" => Some(Pattern::IsoZoned),
            "ISO_LOCAL_DATE_TIME" => Some(Pattern::IsoLocal),
            "ISO_INSTANT" => Some(Pattern::IsoInstant),
            _ => None,
        };
        if let Some(pattern) = named {
            return Ok(Self { pattern, zone });
        }
        if pattern.is_empty() || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(InvalidPattern(pattern.to_owned()));
        }
        Ok(Self {
            pattern: Pattern::Custom(pattern.to_owned()),
            zone,
        })
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        match self.zone {
            Zone::Local => self.render(instant.with_timezone(&Local)),
            Zone::Fixed(offset) => self.render(instant.with_timezone(&offset)),
            Zone::Named(tz) => self.render(instant.with_timezone(&tz)),
        }
    }

    fn render<Z>(&self, time: DateTime<Z>) -> String
    where
        Z: TimeZone,
        Z::Offset: fmt::Display,
    {
        match &self.pattern {
            Pattern::IsoOffset => time.format(ISO_OFFSET).to_string(),
            Pattern::IsoZoned => format!("{}[{}]", time.format(ISO_OFFSET), self.zone.label()),
            Pattern::IsoLocal => time.format(ISO_LOCAL).to_string(),
            Pattern::IsoInstant => time.with_timezone(&Utc).format(ISO_INSTANT).to_string(),
            Pattern::Custom(pattern) => time.format(pattern.as_str()).to_string(),
        }
    }
}
