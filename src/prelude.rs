//! Convenience re-exports for common usage patterns.
//!
//! Import everything with:
//!
//! ```
//! use error_index::prelude::*;
//! ```
//!
//! # Examples
//!
//! ```
//! use error_index::prelude::*;
//!
//! let registry = Registry::new();
//! let storage = registry.register_module("storage");
//!
//! let idx = errorf!(storage, "block {} unreadable", 9);
//! assert!(storage.owns_index(idx));
//! ```

// Macros
pub use crate::errorf;

// Core types
pub use crate::index::Index;
pub use crate::registry::{Module, Registry};
pub use crate::types::{CausalError, ErrorValue};

// Query helpers
pub use crate::types::{index_is, message_is};
