//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the property reader handle syntax)
//! - Check that zone, timestamp pattern and abbreviation values parse
//! - Check that custom fields form a JSON object
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Only an unknown time zone is fatal; the rest fall back to defaults
//! - Validation is pure function: LoggerSettings → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::LoggerSettings;
use crate::encoder::abbreviator::AbbreviationPolicy;
use crate::encoder::json::parse_custom_fields;
use crate::encoder::timestamp::{InvalidPattern, InvalidTimeZone, TimestampFormat, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    TimeZone(#[from] InvalidTimeZone),

    #[error(transparent)]
    TimestampPattern(#[from] InvalidPattern),

    #[error("invalid name target length '{0}'")]
    NameTargetLength(String),

    #[error("invalid custom fields: {0}")]
    CustomFields(String),
}

impl ValidationError {
    /// Fatal errors abort context construction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::TimeZone(_))
    }

    /// Configuration key the error refers to.
    pub fn key(&self) -> &'static str {
        match self {
            ValidationError::TimeZone(_) => "logger.timezone",
            ValidationError::TimestampPattern(_) => "logger.timestampPattern",
            ValidationError::NameTargetLength(_) => "logger.nameTargetLength",
            ValidationError::CustomFields(_) => "logger.customFields",
        }
    }
}

/// Validate settings, collecting every problem found.
pub fn validate_settings(settings: &LoggerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let zone = match Zone::parse(settings.timezone.as_deref()) {
        Ok(zone) => zone,
        Err(e) => {
            errors.push(e.into());
            Zone::Local
        }
    };
    if let Some(pattern) = settings.timestamp_pattern.as_deref() {
        if let Err(e) = TimestampFormat::parse(pattern, zone) {
            errors.push(e.into());
        }
    }
    if AbbreviationPolicy::parse(&settings.name_target_length).is_none() {
        errors.push(ValidationError::NameTargetLength(settings.name_target_length.clone()));
    }
    if let Some(fields) = settings.custom_fields.as_deref() {
        if let Err(e) = parse_custom_fields(fields) {
            errors.push(ValidationError::CustomFields(e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_settings(&LoggerSettings::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let settings = LoggerSettings {
            timezone: Some("Mars/Olympus".into()),
            name_target_length: "tiny".into(),
            custom_fields: Some("[1,2]".into()),
            ..Default::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].is_fatal());
        assert_eq!(errors[0].key(), "logger.timezone");
        assert!(!errors[1].is_fatal());
        assert!(!errors[2].is_fatal());
    }

    #[test]
    fn test_bad_pattern_is_not_fatal() {
        let settings = LoggerSettings {
            timestamp_pattern: Some("%Y-%Q".into()),
            ..Default::default()
        };
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].is_fatal());
        assert_eq!(errors[0].key(), "logger.timestampPattern");
    }

    #[test]
    fn test_offset_zone_is_valid() {
        let settings = LoggerSettings {
            timezone: Some("GMT+10".into()),
            timestamp_pattern: Some("ISO_ZONED_DATE_TIME".into()),
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_ok());
    }
}
