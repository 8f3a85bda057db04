//! Explicit level assignments keyed by logger name prefix.

use dashmap::DashMap;

use crate::level::Level;

/// Stores `prefix -> level` assignments and resolves the effective level of
/// any dotted logger name.
///
/// Lookups walk from the full name towards the root, one dot segment at a
/// time, so resolution costs one map probe per segment.
#[derive(Debug)]
pub struct LevelRegistry {
    levels: DashMap<String, Level>,
    default_level: Level,
}

impl LevelRegistry {
    /// Create an empty registry falling back to `default_level`.
    pub fn new(default_level: Level) -> Self {
        Self {
            levels: DashMap::new(),
            default_level,
        }
    }

    /// The level used when no stored prefix matches.
    pub fn default_level(&self) -> Level {
        self.default_level
    }

    /// Store an assignment. Last write per exact prefix wins.
    pub fn store(&self, prefix: impl Into<String>, level: Level) {
        self.levels.insert(prefix.into(), level);
    }

    /// Level explicitly stored for this exact key, if any.
    pub fn get(&self, prefix: &str) -> Option<Level> {
        self.levels.get(prefix).map(|r| *r.value())
    }

    /// Resolve the effective level for `name`.
    pub fn resolve(&self, name: &str) -> Level {
        self.lookup(name).unwrap_or(self.default_level)
    }

    fn lookup(&self, name: &str) -> Option<Level> {
        let mut candidate = name;
        loop {
            if let Some(level) = self.get(candidate) {
                return Some(level);
            }
            match candidate.rfind('.') {
                Some(idx) => candidate = &candidate[..idx],
                None => return None,
            }
        }
    }

    /// Number of stored assignments.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if no assignment has been stored.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
