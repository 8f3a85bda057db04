//! Owner of everything a set of loggers shares.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::config::loader::{self, ConfigError};
use crate::config::schema::{LoggerSettings, WriterKind};
use crate::config::validation::{validate_settings, ValidationError};
use crate::encoder::abbreviator::{AbbreviationPolicy, Abbreviator};
use crate::encoder::json::{JsonEncoder, PropertyNames};
use crate::encoder::plain::PlainEncoder;
use crate::encoder::throwable::ThrowableRenderer;
use crate::encoder::timestamp::{TimestampFormat, Zone};
use crate::encoder::{LogWriter, RecordEncoder, SinkWriter};
use crate::level::{Level, LevelCoordinator, LevelRegistry};
use crate::logger::{Logger, LoggerCache};

/// Level registry, logger cache, name abbreviator and writer, built once
/// from configuration and shared by every logger it hands out.
///
/// Levels are the only runtime-mutable part; use [`LoggerContext::put_all`]
/// to change them.
pub struct LoggerContext {
    registry: Arc<LevelRegistry>,
    loggers: Arc<LoggerCache>,
    coordinator: LevelCoordinator,
    abbreviator: Arc<dyn Abbreviator>,
    writer: Arc<dyn LogWriter>,
}

impl LoggerContext {
    /// Build a context around an existing writer.
    ///
    /// `initial_levels` maps names or prefixes to level strings; unknown
    /// level strings are treated as INFO.
    pub fn new(
        writer: Arc<dyn LogWriter>,
        policy: AbbreviationPolicy,
        default_level: Level,
        initial_levels: &HashMap<String, String>,
    ) -> Self {
        let registry = Arc::new(LevelRegistry::new(default_level));
        for (name, level) in initial_levels {
            registry.store(name.as_str(), Level::parse_lenient(level));
        }
        let loggers = Arc::new(LoggerCache::new());
        let coordinator = LevelCoordinator::new(registry.clone(), loggers.clone());

        tracing::debug!(
            default_level = %default_level,
            assignments = registry.len(),
            "Logger context initialized"
        );

        Self {
            registry,
            loggers,
            coordinator,
            abbreviator: policy.build(),
            writer,
        }
    }

    /// Build a context writing encoded records to `sink`.
    ///
    /// Fails only on fatal configuration errors (an unknown time zone).
    /// Other invalid values are reported and replaced by their defaults.
    pub fn from_settings(settings: &LoggerSettings, sink: Box<dyn Write + Send>) -> Result<Self, ConfigError> {
        let errors = validate_settings(settings).err().unwrap_or_default();
        let (fatal, recoverable): (Vec<_>, Vec<_>) = errors.into_iter().partition(ValidationError::is_fatal);
        if !fatal.is_empty() {
            return Err(ConfigError::Validation(fatal));
        }
        for error in &recoverable {
            crate::observability::reporter::report_config_error(error.key(), error);
        }
        let custom_fields_valid = !recoverable
            .iter()
            .any(|e| matches!(e, ValidationError::CustomFields(_)));

        let zone = Zone::parse(settings.timezone.as_deref())
            .map_err(|e| ConfigError::Validation(vec![e.into()]))?;
        let pattern = settings
            .timestamp_pattern
            .as_deref()
            .and_then(|p| TimestampFormat::parse(p, zone).ok());

        let renderer = ThrowableRenderer::new()
            .max_length(settings.max_throwable_length)
            .max_frames_per_throwable(settings.max_depth_per_throwable)
            .root_cause_first(settings.root_cause_first);

        let encoder: Box<dyn RecordEncoder> = match settings.format {
            WriterKind::Json => Box::new(
                JsonEncoder::builder()
                    .component(settings.component.clone())
                    .environment(settings.environment.clone())
                    .property_names(PropertyNames::parse(settings.property_names.as_deref()))
                    .custom_fields(settings.custom_fields.as_deref().filter(|_| custom_fields_valid))
                    .timestamp(pattern.unwrap_or_else(|| TimestampFormat::json_default(zone)))
                    .include_stack_hash(settings.include_stack_hash)
                    .throwable_renderer(renderer)
                    .build(),
            ),
            WriterKind::Plain => Box::new(PlainEncoder::new(
                pattern.unwrap_or_else(|| TimestampFormat::plain_default(zone)),
                settings.show_thread_name,
                renderer,
            )),
        };

        let policy = AbbreviationPolicy::parse(&settings.name_target_length).unwrap_or_default();
        Ok(Self::new(
            Arc::new(SinkWriter::new(encoder, sink)),
            policy,
            Level::parse_lenient(&settings.default_level),
            &settings.levels,
        ))
    }

    /// Build a context from a flat property snapshot.
    pub fn from_properties(
        properties: &HashMap<String, String>,
        sink: Box<dyn Write + Send>,
    ) -> Result<Self, ConfigError> {
        Self::from_settings(&loader::from_properties(properties), sink)
    }

    /// Build a context from a TOML document.
    pub fn from_toml_str(content: &str, sink: Box<dyn Write + Send>) -> Result<Self, ConfigError> {
        Self::from_settings(&loader::from_toml_str(content)?, sink)
    }

    /// Return the logger for `name`, creating it on first request.
    ///
    /// The new logger starts at the level resolved for its name at the
    /// moment of creation.
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        self.loggers.get_or_create_with(name, |name| {
            Logger::new(
                name,
                self.abbreviator.abbreviate(name),
                self.registry.resolve(name),
                self.writer.clone(),
            )
        })
    }

    /// Apply a batch of `name-or-prefix -> level` updates.
    ///
    /// Returns the existing loggers whose level changed, by full name.
    pub fn put_all<I, K, V>(&self, updates: I) -> BTreeMap<String, Level>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.coordinator.apply_batch(updates)
    }

    /// Apply the `log.level.*` entries of a property change set.
    pub fn apply_property_changes(&self, changed: &HashMap<String, String>) -> BTreeMap<String, Level> {
        let updates = loader::level_updates(changed);
        if updates.is_empty() {
            return BTreeMap::new();
        }
        self.put_all(updates)
    }

    /// Level a logger named `name` would be created with now.
    pub fn resolve_level(&self, name: &str) -> Level {
        self.registry.resolve(name)
    }

    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }
}

impl fmt::Debug for LoggerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerContext")
            .field("default_level", &self.registry.default_level())
            .field("assignments", &self.registry.len())
            .field("loggers", &self.loggers.len())
            .field("abbreviator", &self.abbreviator)
            .finish_non_exhaustive()
    }
}
