//! Batched runtime level updates.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::level::{Level, LevelRegistry};
use crate::logger::LoggerCache;
use crate::observability::metrics;

/// Applies level updates to the registry and pushes the resulting levels to
/// loggers that already exist.
///
/// Loggers created after [`LevelCoordinator::apply_batch`] returns resolve
/// the new levels on their own. Loggers read during a batch may see a mix
/// of old and new levels; each individual level write is atomic.
#[derive(Debug, Clone)]
pub struct LevelCoordinator {
    registry: Arc<LevelRegistry>,
    loggers: Arc<LoggerCache>,
}

impl LevelCoordinator {
    pub fn new(registry: Arc<LevelRegistry>, loggers: Arc<LoggerCache>) -> Self {
        Self { registry, loggers }
    }

    /// Apply `name-or-prefix -> level` updates.
    ///
    /// Returns the loggers whose effective level actually changed, keyed by
    /// full name. Re-applying the same batch returns an empty map.
    pub fn apply_batch<I, K, V>(&self, updates: I) -> BTreeMap<String, Level>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parsed: Vec<(String, Level)> = updates
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_owned(), Level::parse_lenient(value.as_ref())))
            .collect();
        if parsed.is_empty() {
            return BTreeMap::new();
        }
        for (key, level) in &parsed {
            self.registry.store(key.as_str(), *level);
        }

        let mut changed = BTreeMap::new();
        for logger in self.loggers.snapshot() {
            if !parsed.iter().any(|(key, _)| affects(key, logger.name())) {
                continue;
            }
            let level = self.registry.resolve(logger.name());
            if logger.set_level(level) {
                changed.insert(logger.name().to_owned(), level);
            }
        }

        if !changed.is_empty() {
            metrics::record_level_changes(changed.len());
            tracing::info!(updates = parsed.len(), changed = changed.len(), "Applied log level updates");
        }
        changed
    }
}

/// True if an update keyed `key` applies to the logger `name`.
///
/// Matches on whole dot segments: `io.ab` covers `io.ab` and `io.ab.Foo`
/// but not `io.abc.Foo`.
pub fn affects(key: &str, name: &str) -> bool {
    match name.strip_prefix(key) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LogWriter;
    use crate::logger::{LogEvent, Logger};

    struct Discard;

    impl LogWriter for Discard {
        fn log(&self, _event: &LogEvent<'_>) {}
    }

    fn setup(default_level: Level) -> (LevelCoordinator, Arc<LevelRegistry>, Arc<LoggerCache>) {
        let registry = Arc::new(LevelRegistry::new(default_level));
        let loggers = Arc::new(LoggerCache::new());
        (LevelCoordinator::new(registry.clone(), loggers.clone()), registry, loggers)
    }

    fn create(registry: &LevelRegistry, loggers: &LoggerCache, name: &str) -> Arc<Logger> {
        loggers.get_or_create_with(name, |n| Logger::new(n, n, registry.resolve(n), Arc::new(Discard)))
    }

    #[test]
    fn test_affects_respects_segment_boundary() {
        assert!(affects("io.ab", "io.ab"));
        assert!(affects("io.ab", "io.ab.Foo"));
        assert!(!affects("io.ab", "io.abc.Foo"));
        assert!(!affects("io.ab.Foo", "io.ab"));
    }

    #[test]
    fn test_batch_updates_existing_logger() {
        let (coordinator, registry, loggers) = setup(Level::Info);
        let bar = create(&registry, &loggers, "org.bar.extra.MyBar");
        let foo = create(&registry, &loggers, "org.foo.MyFoo");

        let changed = coordinator.apply_batch([("org.bar.extra", "trace")]);
        assert_eq!(changed, BTreeMap::from([("org.bar.extra.MyBar".to_owned(), Level::Trace)]));
        assert_eq!(bar.level(), Level::Trace);
        assert_eq!(foo.level(), Level::Info);

        let again = coordinator.apply_batch([("org.bar.extra", "trace")]);
        assert!(again.is_empty());
    }

    #[test]
    fn test_unknown_level_becomes_info() {
        let (coordinator, registry, loggers) = setup(Level::Warn);
        let logger = create(&registry, &loggers, "org.foo.MyFoo");

        let changed = coordinator.apply_batch([("org.foo", "loud")]);
        assert_eq!(changed.get("org.foo.MyFoo"), Some(&Level::Info));
        assert_eq!(logger.level(), Level::Info);
    }

    #[test]
    fn test_more_specific_assignment_still_wins() {
        let (coordinator, registry, loggers) = setup(Level::Info);
        registry.store("org.foo.web", Level::Error);
        let web = create(&registry, &loggers, "org.foo.web.Handler");

        let changed = coordinator.apply_batch([("org.foo", "debug")]);
        assert!(changed.is_empty());
        assert_eq!(web.level(), Level::Error);
    }

    #[test]
    fn test_similar_prefix_not_touched() {
        let (coordinator, registry, loggers) = setup(Level::Info);
        let abc = create(&registry, &loggers, "io.abc.Foo");

        let changed = coordinator.apply_batch([("io.ab", "trace")]);
        assert!(changed.is_empty());
        assert_eq!(abc.level(), Level::Info);
    }

    #[test]
    fn test_loggers_created_later_see_new_levels() {
        let (coordinator, registry, loggers) = setup(Level::Info);
        coordinator.apply_batch([("io.late", "debug")]);

        let late = create(&registry, &loggers, "io.late.Service");
        assert_eq!(late.level(), Level::Debug);
    }
}
