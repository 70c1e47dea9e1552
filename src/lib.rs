//! Process-wide error registration and compaction index.
//!
//! Instead of carrying full error objects (strings, causal chains) across a
//! program, each distinct error is registered once and represented
//! thereafter by a compact 32-bit handle ([`Index`]). The handle encodes
//! which module produced the error and a sequence number within that
//! module, and resolves back to the full text and causal chain at any later
//! point in the same process.
//!
//! All state lives in an explicit [`Registry`]: construct one at your
//! entry point and pass it around; there are no global registries.
//!
//! # Examples
//!
//! ## Register once, carry 4 bytes
//!
//! ```
//! use error_index::Registry;
//!
//! let registry = Registry::new();
//! let billing = registry.register_module("billing");
//!
//! let i1 = billing.new_error("invoice not found");
//! let i2 = billing.new_error("invoice not found");
//! let i3 = billing.new_error("invoice expired");
//!
//! assert_eq!(i1, i2);
//! assert_ne!(i1, i3);
//! assert_eq!(billing.error_count(), 2);
//! assert_eq!(registry.index_string(i1), "Module[billing]: invoice not found");
//! ```
//!
//! ## Causal chains
//!
//! ```
//! use error_index::Registry;
//!
//! let registry = Registry::new();
//! let net = registry.register_module("net");
//!
//! let timeout = net.new_error("connection timed out");
//! let fetch = net.wrap(timeout, "fetch failed");
//!
//! assert_eq!(
//!     registry.index_string(fetch),
//!     "Module[net]: fetch failed: connection timed out"
//! );
//!
//! let err = registry.index_error(fetch);
//! assert!(err.has(&timeout.into()));
//! ```
//!
//! ## Lookups never fail
//!
//! ```
//! use error_index::{Index, Registry};
//!
//! let registry = Registry::new();
//! let fabricated = Index::compose(4096, 7);
//!
//! assert_eq!(registry.index_string(fabricated), "unknown error");
//! assert_eq!(registry.module("not registered").name(), "unknown");
//! ```

/// Case-insensitive fingerprints used as dedup keys.
mod fingerprint;
/// The compact 32-bit error handle.
pub mod index;
/// Formatting sugar over the construction operations.
pub mod macros;
/// Convenience re-exports for quick starts.
pub mod prelude;
/// The registry context object and module handles.
pub mod registry;
/// Error values and chain-query semantics.
pub mod types;

pub use index::Index;
pub use registry::{Module, Registry, UNKNOWN_MODULE};
pub use types::{
    index_is, message_is, CausalError, Chain, ErrorValue, ErrorVec, UNKNOWN_ERROR,
};
