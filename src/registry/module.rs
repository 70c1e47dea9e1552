//! Module handles and the dedup registration algorithm.

use core::fmt;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::fingerprint::fingerprint;
use crate::index::Index;
use crate::registry::Shared;
use crate::types::{CausalError, ErrorValue, UNKNOWN_ERROR};

/// Per-module state: identifier, dedup map, and sequence counter.
pub(crate) struct ModuleInner {
    id: u16,
    name: String,
    seq: AtomicU32,
    dedup: RwLock<FxHashMap<u64, Index>>,
}

impl ModuleInner {
    pub(crate) fn new(id: u16, name: &str) -> Self {
        ModuleInner {
            id,
            name: name.to_string(),
            seq: AtomicU32::new(0),
            dedup: RwLock::new(FxHashMap::default()),
        }
    }

    pub(crate) fn id(&self) -> u16 {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to a named error namespace.
///
/// Cheap to clone and safe to share across threads. All construction
/// operations return an [`Index`] and never fail: repeated identical errors
/// collapse to the same handle, and resource exhaustion degrades to
/// [`Index::UNKNOWN`] rather than erroring.
///
/// # Examples
///
/// ```
/// use error_index::Registry;
///
/// let registry = Registry::new();
/// let billing = registry.register_module("billing");
///
/// let i1 = billing.new_error("invoice not found");
/// let i2 = billing.new_error("invoice not found");
/// assert_eq!(i1, i2);
/// assert_eq!(billing.error_count(), 1);
/// ```
#[derive(Clone)]
pub struct Module {
    pub(crate) inner: Arc<ModuleInner>,
    pub(crate) shared: Arc<Shared>,
}

impl Module {
    /// The module's name, with the casing of its first registration.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// The module's permanent numeric identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u16 {
        self.inner.id()
    }

    /// Number of distinct (deduplicated) errors registered so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.inner.dedup.read().len()
    }

    /// Registers `message` and returns its handle.
    pub fn new_error(&self, message: impl Into<String>) -> Index {
        self.register(message.into(), None)
    }

    /// Formats the message first, then behaves as [`Module::new_error`].
    ///
    /// The [`errorf!`](crate::errorf) macro is sugar over this.
    pub fn new_errorf(&self, args: fmt::Arguments<'_>) -> Index {
        self.register(args.to_string(), None)
    }

    /// Registers `message` with `cause` as its causal link.
    ///
    /// The cause participates in the dedup key, so wrapping two different
    /// causes with the same text yields two distinct handles.
    pub fn wrap(&self, cause: impl Into<ErrorValue>, message: impl Into<String>) -> Index {
        let cause = self.resolve_cause(cause.into());
        self.register(message.into(), Some(cause))
    }

    /// Re-homes the error registered under `target` into this module,
    /// preserving `cause` as the causal link.
    ///
    /// The new registration takes `target`'s stored message, or the
    /// `"unknown error"` sentinel when `target` cannot be resolved.
    pub fn wrap_index(&self, cause: impl Into<ErrorValue>, target: Index) -> Index {
        let message = match self.shared.store.get(target) {
            Some(err) => err.message().to_string(),
            None => UNKNOWN_ERROR.to_string(),
        };
        let cause = self.resolve_cause(cause.into());
        self.register(message, Some(cause))
    }

    /// Resolves `idx` to its full rendering, or `"unknown error"`.
    #[must_use]
    pub fn index_string(&self, idx: Index) -> String {
        self.shared.index_string(idx)
    }

    /// Resolves `idx` to its registered error value, or a sentinel message.
    #[must_use]
    pub fn index_error(&self, idx: Index) -> ErrorValue {
        self.shared.index_error(idx)
    }

    /// Whether `idx` was issued by this module.
    ///
    /// True iff the handle's module field matches this module's identifier
    /// and its sequence field is within the range allocated so far.
    #[must_use]
    pub fn owns_index(&self, idx: Index) -> bool {
        idx.module_id() == self.inner.id
            && idx.seq() >= 1
            && u32::from(idx.seq()) <= self.inner.seq.load(Ordering::Relaxed)
    }

    /// Membership test against the dedup map, independent of chain walking:
    /// has an error rendering exactly like `err` been registered here?
    #[must_use]
    pub fn has_registered(&self, err: &ErrorValue) -> bool {
        let key = fingerprint(&err.to_string());
        self.inner.dedup.read().contains_key(&key)
    }

    /// Typed downcast: the handle `err` exposes, when this module issued it.
    #[must_use]
    pub fn find(&self, err: &ErrorValue) -> Option<Index> {
        err.index().filter(|idx| self.owns_index(*idx))
    }

    /// Turns any error shape into a chain link, resolving bare handles
    /// through the store so the link renders without further registry
    /// access. Unresolvable handles keep their index with the sentinel
    /// message, so index-based queries still work.
    fn resolve_cause(&self, value: ErrorValue) -> Arc<CausalError> {
        match value {
            ErrorValue::Causal(c) => c,
            ErrorValue::Message(msg) => {
                Arc::new(CausalError::new(Index::UNKNOWN, msg, None))
            }
            ErrorValue::Indexed(idx) => self.shared.store.get(idx).unwrap_or_else(|| {
                Arc::new(CausalError::new(idx, UNKNOWN_ERROR.to_string(), None))
            }),
        }
    }

    /// The uniform registration algorithm: fingerprint the full rendering
    /// (cause suffix included), return the existing handle on a dedup hit,
    /// otherwise allocate a sequence number and publish first-writer-wins.
    fn register(&self, message: String, cause: Option<Arc<CausalError>>) -> Index {
        let key = match &cause {
            Some(link) => fingerprint(&format!("{message}: {link}")),
            None => fingerprint(&message),
        };

        if let Some(&idx) = self.inner.dedup.read().get(&key) {
            return idx;
        }

        // Counter ordering is independent of map publication; the dedup
        // lock fences the map itself.
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        if seq > u32::from(u16::MAX) {
            // Sequence space exhausted: saturate instead of wrapping into
            // another module's index range.
            self.inner.seq.fetch_sub(1, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::warn!(module = self.inner.name(), "sequence space exhausted");
            return Index::UNKNOWN;
        }
        let idx = Index::compose(self.inner.id, seq as u16);

        let admitted = {
            let mut dedup = self.inner.dedup.write();
            match dedup.entry(key) {
                Entry::Occupied(slot) => {
                    // Lost the get-or-create race: hand back our sequence
                    // number if nobody allocated past it in the meantime.
                    let _ = self.inner.seq.compare_exchange(
                        seq,
                        seq - 1,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    );
                    return *slot.get();
                }
                Entry::Vacant(slot) => {
                    let err = Arc::new(CausalError::new(idx, message, cause));
                    // Store before the dedup entry becomes visible, so any
                    // caller that observes the handle can resolve it.
                    self.shared.store.insert(idx, err.clone());
                    slot.insert(idx);
                    err
                }
            }
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            module = self.inner.name(),
            index = %idx,
            error = %admitted,
            "registered error"
        );
        self.shared.fire_handler(&admitted);
        idx
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.inner.name())
            .field("id", &self.inner.id())
            .field("errors", &self.error_count())
            .finish()
    }
}
