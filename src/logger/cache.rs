//! Create-once cache of loggers by name.

use std::sync::Arc;

use dashmap::DashMap;

use crate::logger::Logger;
use crate::observability::metrics;

/// Loggers keyed by full name.
///
/// Concurrent requests for the same unseen name construct exactly one
/// logger; every caller receives that instance. Contention is per shard,
/// never on the whole map.
#[derive(Debug, Default)]
pub struct LoggerCache {
    loggers: DashMap<String, Arc<Logger>>,
}

impl LoggerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the logger for `name`, running `create` only if none exists yet.
    pub fn get_or_create_with<F>(&self, name: &str, create: F) -> Arc<Logger>
    where
        F: FnOnce(&str) -> Logger,
    {
        if let Some(existing) = self.loggers.get(name) {
            return Arc::clone(existing.value());
        }

        let mut created = false;
        // the entry holds the shard lock until construction finishes
        let logger = self
            .loggers
            .entry(name.to_owned())
            .or_insert_with(|| {
                created = true;
                Arc::new(create(name))
            })
            .value()
            .clone();

        if created {
            tracing::trace!(logger = name, level = %logger.level(), "Logger created");
            metrics::record_logger_count(self.loggers.len());
        }
        logger
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Point-in-time copy of every logger created so far.
    pub fn snapshot(&self) -> Vec<Arc<Logger>> {
        self.loggers.iter().map(|r| Arc::clone(r.value())).collect()
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LogWriter;
    use crate::level::Level;
    use crate::logger::LogEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    struct Discard;

    impl LogWriter for Discard {
        fn log(&self, _event: &LogEvent<'_>) {}
    }

    fn make(name: &str) -> Logger {
        Logger::new(name, name, Level::Info, Arc::new(Discard))
    }

    #[test]
    fn test_returns_same_instance() {
        let cache = LoggerCache::new();
        let a = cache.get_or_create_with("org.foo.A", make);
        let b = cache.get_or_create_with("org.foo.A", make);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_creation_runs_once() {
        const THREADS: usize = 16;
        let cache = Arc::new(LoggerCache::new());
        let constructions = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = cache.clone();
                let constructions = constructions.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_create_with("io.race.Target", |name| {
                        constructions.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        make(name)
                    })
                })
            })
            .collect();

        let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(loggers.iter().all(|l| Arc::ptr_eq(l, &loggers[0])));
    }
}
