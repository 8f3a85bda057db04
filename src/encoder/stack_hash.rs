//! Deterministic content hash of an error's shape.
//!
//! Two errors of the same type thrown from the same frames hash equally,
//! regardless of message text or line numbers. Useful for grouping records
//! in a log store.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::encoder::throwable::{AcceptAll, FrameFilter, Throwable};

/// Bytes of the digest kept in the hex output.
const HASH_BYTES: usize = 4;

#[derive(Clone)]
pub struct StackHasher {
    filter: Arc<dyn FrameFilter>,
}

impl Default for StackHasher {
    fn default() -> Self {
        Self::new(Arc::new(AcceptAll))
    }
}

impl std::fmt::Debug for StackHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackHasher").finish_non_exhaustive()
    }
}

impl StackHasher {
    /// Frames rejected by `filter` do not contribute to the hash.
    pub fn new(filter: Arc<dyn FrameFilter>) -> Self {
        Self { filter }
    }

    /// Hex hash over the outermost throwable's class name and frames.
    pub fn hex_hash(&self, throwable: &Throwable) -> String {
        let mut hasher = Sha256::new();
        hasher.update(throwable.class_name.as_bytes());
        for frame in throwable.frames.iter().filter(|f| self.filter.include(f)) {
            hasher.update(b"\n");
            hasher.update(frame.class_name.as_bytes());
            hasher.update(b".");
            hasher.update(frame.method.as_bytes());
            if let Some(file) = &frame.file {
                hasher.update(b"(");
                hasher.update(file.as_bytes());
                hasher.update(b")");
            }
        }
        let digest = hasher.finalize();
        hex::encode(&digest[..HASH_BYTES])
    }
}
