//! Error value types and chain-query semantics.

use smallvec::SmallVec;

pub mod causal_error;

pub use causal_error::*;

/// SmallVec-backed collection used for collected error chains.
///
/// Causal chains are almost always short; inline storage for up to 4 links
/// keeps chain collection off the heap in the common case.
pub type ErrorVec<T> = SmallVec<[T; 4]>;
