//! Append-only store resolving an [`Index`] back to its registered error.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::index::Index;
use crate::types::CausalError;

/// Registry-wide map from handle to registered error.
///
/// Shared by every module of a registry, so handles are globally unique
/// discriminators regardless of which module issued them. Entries are
/// write-once and never removed.
#[derive(Default)]
pub(crate) struct ErrorStore {
    entries: RwLock<FxHashMap<Index, Arc<CausalError>>>,
}

impl ErrorStore {
    pub(crate) fn get(&self, idx: Index) -> Option<Arc<CausalError>> {
        self.entries.read().get(&idx).cloned()
    }

    /// Inserts the error registered under `idx`. Callers guarantee the key
    /// is fresh; the winning dedup publication happens exactly once per
    /// index.
    pub(crate) fn insert(&self, idx: Index, err: Arc<CausalError>) {
        self.entries.write().insert(idx, err);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
