//! Compact 32-bit error handles.
//!
//! An [`Index`] packs a module identifier into its high 16 bits and a
//! per-module sequence number into its low 16 bits. It is a process-local
//! interning key: the same value always resolves to the same registered error
//! for the lifetime of the [`Registry`](crate::Registry) that issued it, but
//! it is not stable across processes or restarts.
//!
//! # Examples
//!
//! ```
//! use error_index::Index;
//!
//! let idx = Index::compose(3, 17);
//! assert_eq!(idx.module_id(), 3);
//! assert_eq!(idx.seq(), 17);
//! assert!(!idx.is_unknown());
//! assert!(Index::UNKNOWN.is_unknown());
//! ```

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compact handle standing in for a registered error.
///
/// High 16 bits: module identifier. Low 16 bits: per-module sequence number.
/// The zero value is reserved and means "unknown error in unknown module".
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Index(u32);

impl Index {
    /// The reserved zero handle: unknown error in unknown module.
    pub const UNKNOWN: Index = Index(0);

    /// Packs a module identifier and a sequence number into one handle.
    #[inline]
    #[must_use]
    pub const fn compose(module_id: u16, seq: u16) -> Self {
        Index(((module_id as u32) << 16) | seq as u32)
    }

    /// Reconstructs a handle from its raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Index(raw)
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the module identifier encoded in the high 16 bits.
    #[inline]
    #[must_use]
    pub const fn module_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns the per-module sequence number encoded in the low 16 bits.
    #[inline]
    #[must_use]
    pub const fn seq(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Whether this is the reserved [`Index::UNKNOWN`] handle.
    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module_id(), self.seq())
    }
}

/// A bare handle is usable anywhere an error is expected. It renders in the
/// compact `<module>:<seq>` form; resolve through the issuing registry for
/// the full message.
impl std::error::Error for Index {}

impl From<u32> for Index {
    #[inline]
    fn from(raw: u32) -> Self {
        Index(raw)
    }
}

impl From<Index> for u32 {
    #[inline]
    fn from(idx: Index) -> Self {
        idx.0
    }
}
