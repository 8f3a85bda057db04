//! Building settings from a configuration snapshot.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{LoggerSettings, WriterKind};
use crate::config::validation::ValidationError;
use crate::observability::reporter;

/// Prefix of per-name level keys in the property snapshot.
pub const LEVEL_PREFIX: &str = "log.level.";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read settings from a flat property snapshot.
///
/// Unparseable numbers are reported and replaced by their defaults; this
/// never fails.
pub fn from_properties(properties: &HashMap<String, String>) -> LoggerSettings {
    let mut settings = LoggerSettings::default();
    let get = |key: &str| properties.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
    let owned = |key: &str| get(key).map(str::to_owned);

    if let Some(level) = get("logger.defaultLogLevel") {
        settings.default_level = level.to_owned();
    }
    if let Some(format) = get("logger.format") {
        settings.format = WriterKind::parse(format);
    }
    if let Some(length) = get("logger.nameTargetLength") {
        settings.name_target_length = length.to_owned();
    }
    settings.timestamp_pattern = owned("logger.timestampPattern");
    settings.timezone = owned("logger.timezone");
    settings.component = owned("logger.component");
    settings.environment = owned("logger.environment");
    settings.custom_fields = owned("logger.customFields");
    settings.property_names = owned("logger.propertyNames");

    if let Some(show) = get("logger.showThreadName") {
        settings.show_thread_name = parse_bool(show);
    }
    if let Some(include) = get("logger.includeStackHash") {
        settings.include_stack_hash = parse_bool(include);
    }
    if let Some(first) = get("logger.rootCauseFirst") {
        settings.root_cause_first = parse_bool(first);
    }
    if let Some(max) = get("logger.maxThrowableLength") {
        match max.parse() {
            Ok(max) => settings.max_throwable_length = max,
            Err(e) => reporter::report_config_error("logger.maxThrowableLength", &e),
        }
    }
    if let Some(depth) = get("logger.maxDepthPerThrowable") {
        match depth.parse::<i64>() {
            Ok(depth) if depth > 0 => settings.max_depth_per_throwable = usize::try_from(depth).ok(),
            Ok(_) => settings.max_depth_per_throwable = None,
            Err(e) => reporter::report_config_error("logger.maxDepthPerThrowable", &e),
        }
    }

    settings.levels = properties
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LEVEL_PREFIX)
                .map(|name| (name.to_owned(), value.trim().to_owned()))
        })
        .collect();
    settings
}

/// Read settings from a TOML document.
pub fn from_toml_str(content: &str) -> Result<LoggerSettings, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Extract `log.level.*` entries from a property change set, keyed by
/// logger name or prefix.
pub fn level_updates<'a, I>(changed: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    changed
        .into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LEVEL_PREFIX)
                .map(|name| (name.to_owned(), value.clone()))
        })
        .collect()
}

/// `true` (any case) is true; everything else is false.
fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_from_empty_snapshot() {
        assert_eq!(from_properties(&HashMap::new()), LoggerSettings::default());
    }

    #[test]
    fn test_reads_properties() {
        let settings = from_properties(&props(&[
            ("logger.defaultLogLevel", "debug"),
            ("logger.format", "PLAIN"),
            ("logger.nameTargetLength", "short"),
            ("logger.timezone", "UTC"),
            ("logger.component", "orders"),
            ("logger.showThreadName", "false"),
            ("logger.includeStackHash", "FALSE"),
            ("logger.maxThrowableLength", "512"),
            ("logger.maxDepthPerThrowable", "8"),
            ("log.level.io.avaje", "warn"),
            ("log.level.io.banana", " trace "),
            ("unrelated", "x"),
        ]));

        assert_eq!(settings.default_level, "debug");
        assert_eq!(settings.format, WriterKind::Plain);
        assert_eq!(settings.name_target_length, "short");
        assert_eq!(settings.timezone.as_deref(), Some("UTC"));
        assert_eq!(settings.component.as_deref(), Some("orders"));
        assert!(!settings.show_thread_name);
        assert!(!settings.include_stack_hash);
        assert_eq!(settings.max_throwable_length, 512);
        assert_eq!(settings.max_depth_per_throwable, Some(8));
        assert_eq!(settings.levels.len(), 2);
        assert_eq!(settings.levels["io.avaje"], "warn");
        assert_eq!(settings.levels["io.banana"], "trace");
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let settings = from_properties(&props(&[
            ("logger.maxThrowableLength", "lots"),
            ("logger.maxDepthPerThrowable", "-1"),
        ]));
        assert_eq!(settings.max_throwable_length, 20_000);
        assert_eq!(settings.max_depth_per_throwable, None);
    }

    #[test]
    fn test_from_toml() {
        let settings = from_toml_str(
            r#"
            default_level = "warn"
            format = "plain"
            name_target_length = "20"

            [levels]
            "io.avaje.http" = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.default_level, "warn");
        assert_eq!(settings.format, WriterKind::Plain);
        assert_eq!(settings.levels["io.avaje.http"], "debug");
        assert!(settings.show_thread_name);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(matches!(from_toml_str("format = [1"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_level_updates_filters_keys() {
        let changed = props(&[("junk", "junk"), ("log.level.org.foo", "debug"), ("log.level.org.bar.extra", "warn")]);
        let updates = level_updates(&changed);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates["org.foo"], "debug");
        assert_eq!(updates["org.bar.extra"], "warn");
    }
}
