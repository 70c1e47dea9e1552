//! The registry context object: module directory, error store, and hook.
//!
//! All state lives in an explicit [`Registry`] constructed by the
//! application and passed to callers; there is no package-level mutable
//! state, so each test can build a fresh registry in isolation. A
//! `Registry` is an [`Arc`] handle: clone it freely, every clone sees the
//! same directory and store.
//!
//! # Examples
//!
//! ```
//! use error_index::Registry;
//!
//! let registry = Registry::new();
//! let billing = registry.register_module("billing");
//! let idx = billing.new_error("invoice not found");
//!
//! assert_eq!(registry.index_string(idx), "Module[billing]: invoice not found");
//! ```

use core::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::fingerprint::fingerprint;
use crate::index::Index;
use crate::types::{CausalError, ErrorValue, UNKNOWN_ERROR};

pub mod module;
mod store;

pub use module::Module;

use module::ModuleInner;
use store::ErrorStore;

/// Name of the reserved fallback module at identifier 0.
pub const UNKNOWN_MODULE: &str = "unknown";

type ErrorHandler = Arc<dyn Fn(&CausalError) + Send + Sync>;

/// Module directory: name fingerprint to module, plus the parallel
/// identifier-to-name-fingerprint table for reverse lookup. Both
/// append-only; identifier allocation happens under the write lock, so a
/// lost registration race can never consume an identifier.
struct Directory {
    by_name: FxHashMap<u64, Arc<ModuleInner>>,
    names: Vec<u64>,
}

pub(crate) struct Shared {
    directory: RwLock<Directory>,
    pub(crate) store: ErrorStore,
    handler: RwLock<Option<ErrorHandler>>,
    unknown: Arc<ModuleInner>,
}

impl Shared {
    pub(crate) fn index_string(&self, idx: Index) -> String {
        match self.store.get(idx) {
            Some(err) => format!("Module[{}]: {}", self.module_name_for(idx), err),
            None => UNKNOWN_ERROR.to_string(),
        }
    }

    pub(crate) fn index_error(&self, idx: Index) -> ErrorValue {
        match self.store.get(idx) {
            Some(err) => ErrorValue::Causal(err),
            None => ErrorValue::Message(UNKNOWN_ERROR.to_string()),
        }
    }

    fn module_name_for(&self, idx: Index) -> String {
        let dir = self.directory.read();
        let inner = dir
            .names
            .get(usize::from(idx.module_id()))
            .and_then(|key| dir.by_name.get(key))
            .unwrap_or(&self.unknown);
        inner.name().to_string()
    }

    /// Invoked exactly once per newly admitted error, outside all internal
    /// locks, so a re-entrant handler can itself register errors.
    pub(crate) fn fire_handler(&self, err: &CausalError) {
        let handler = self.handler.read().clone();
        if let Some(handler) = handler {
            handler(err);
        }
    }
}

/// Error registration and compaction index.
///
/// Owns the module directory, the append-only error store, and the
/// error-handler hook. Every lookup degrades gracefully (unregistered
/// names resolve to the reserved [`UNKNOWN_MODULE`], unresolvable handles
/// to the `"unknown error"` sentinel), so nothing here returns a `Result`.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<Shared>,
}

impl Registry {
    /// Fresh registry with the reserved `"unknown"` module at identifier 0.
    #[must_use]
    pub fn new() -> Self {
        let unknown = Arc::new(ModuleInner::new(0, UNKNOWN_MODULE));
        let key = fingerprint(UNKNOWN_MODULE);
        let mut by_name = FxHashMap::default();
        by_name.insert(key, unknown.clone());
        Registry {
            shared: Arc::new(Shared {
                directory: RwLock::new(Directory { by_name, names: vec![key] }),
                store: ErrorStore::default(),
                handler: RwLock::new(None),
                unknown,
            }),
        }
    }

    /// Case-insensitive idempotent registration.
    ///
    /// An existing name returns the existing handle without consuming an
    /// identifier. Exactly-once under concurrency: racing callers for the
    /// same new name all observe one module and one consumed identifier.
    /// Identifier exhaustion degrades to the unknown module.
    pub fn register_module(&self, name: &str) -> Module {
        let key = fingerprint(name);
        if let Some(inner) = self.shared.directory.read().by_name.get(&key) {
            return self.handle(inner.clone());
        }

        let inner = {
            let mut dir = self.shared.directory.write();
            // Recheck under the write lock: a racing caller may have
            // published this name since the optimistic read.
            if let Some(existing) = dir.by_name.get(&key) {
                return self.handle(existing.clone());
            }
            let id = dir.names.len();
            if id > usize::from(u16::MAX) {
                #[cfg(feature = "tracing")]
                tracing::warn!(module = name, "module identifier space exhausted");
                return self.unknown_module();
            }
            let inner = Arc::new(ModuleInner::new(id as u16, name));
            dir.names.push(key);
            dir.by_name.insert(key, inner.clone());
            inner
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(module = name, id = inner.id(), "registered module");
        self.handle(inner)
    }

    /// Looks up a registered module; absent names degrade to the unknown
    /// module, never an error.
    #[must_use]
    pub fn module(&self, name: &str) -> Module {
        let key = fingerprint(name);
        match self.shared.directory.read().by_name.get(&key) {
            Some(inner) => self.handle(inner.clone()),
            None => self.unknown_module(),
        }
    }

    /// Decodes the module identifier from `idx` and looks it up; degrades
    /// to the unknown module on any miss.
    #[must_use]
    pub fn module_for_index(&self, idx: Index) -> Module {
        let dir = self.shared.directory.read();
        let inner = dir
            .names
            .get(usize::from(idx.module_id()))
            .and_then(|key| dir.by_name.get(key))
            .cloned();
        drop(dir);
        match inner {
            Some(inner) => self.handle(inner),
            None => self.unknown_module(),
        }
    }

    /// The reserved fallback module at identifier 0.
    #[must_use]
    pub fn unknown_module(&self) -> Module {
        self.handle(self.shared.unknown.clone())
    }

    /// Registers `message` against the unknown module; the module-free
    /// entry point for callers without a module of their own.
    pub fn new_error(&self, message: impl Into<String>) -> Index {
        self.unknown_module().new_error(message)
    }

    /// Formats first, then behaves as [`Registry::new_error`].
    pub fn new_errorf(&self, args: fmt::Arguments<'_>) -> Index {
        self.unknown_module().new_errorf(args)
    }

    /// Resolves `idx` to `"Module[<name>]: <message>[: <cause>…]"`, or the
    /// `"unknown error"` sentinel when it cannot be resolved.
    #[must_use]
    pub fn index_string(&self, idx: Index) -> String {
        self.shared.index_string(idx)
    }

    /// Resolves `idx` to its registered error value, or a sentinel message
    /// value when it cannot be resolved.
    #[must_use]
    pub fn index_error(&self, idx: Index) -> ErrorValue {
        self.shared.index_error(idx)
    }

    /// Number of distinct errors registered across all modules.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.shared.store.len()
    }

    /// Number of registered modules, the reserved one included.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.shared.directory.read().names.len()
    }

    /// Installs the hook invoked exactly once per newly admitted
    /// (non-duplicate) error. Last writer wins; no ordering guarantee
    /// relative to registrations already in flight.
    pub fn set_error_handler(&self, handler: impl Fn(&CausalError) + Send + Sync + 'static) {
        *self.shared.handler.write() = Some(Arc::new(handler));
    }

    fn handle(&self, inner: Arc<ModuleInner>) -> Module {
        Module { inner, shared: self.shared.clone() }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("modules", &self.module_count())
            .field("errors", &self.error_count())
            .finish()
    }
}
