//! Registered error values and the closed set of shapes the chain queries
//! understand.
//!
//! Two equality notions are kept deliberately separate:
//!
//! - [`CausalError::is`]: a permissive shallow "is this *the* error" test,
//!   matching by index or by message text against the top of the chain only.
//! - [`CausalError::has`]: strict chain membership, "does this error's
//!   causal chain contain the target", matching each link by identity.
//!
//! Most error libraries conflate the two; keeping them as named operations
//! lets callers choose shallow vs. deep matching explicitly.

use core::fmt;
use std::sync::Arc;

use crate::index::Index;
use crate::types::ErrorVec;

/// Sentinel text produced when an [`Index`] cannot be resolved.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// A registered error: its handle, its message, and its optional cause.
///
/// The chain is immutable once constructed; wrapping an error never mutates
/// the wrapped error. Values are handed out behind [`Arc`] by the registry,
/// so holding one keeps exactly the chain it was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalError {
    index: Index,
    message: String,
    cause: Option<Arc<CausalError>>,
}

impl CausalError {
    pub(crate) fn new(index: Index, message: String, cause: Option<Arc<CausalError>>) -> Self {
        CausalError { index, message, cause }
    }

    /// The handle this error was registered under.
    ///
    /// [`Index::UNKNOWN`] for detached values that never went through a
    /// registry (plain-message causes, unresolvable indexed causes).
    #[inline]
    #[must_use]
    pub fn index(&self) -> Index {
        self.index
    }

    /// The message text, without the cause suffix.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exactly the immediate cause, or `None` at the end of the chain.
    #[inline]
    #[must_use]
    pub fn cause(&self) -> Option<&CausalError> {
        self.cause.as_deref()
    }

    /// Iterates the causal chain from this error down to its root cause.
    #[inline]
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Collects the causal chain, outermost error first.
    #[must_use]
    pub fn error_chain(&self) -> ErrorVec<&CausalError> {
        self.chain().collect()
    }

    /// Permissive shallow identity test against the top of the chain.
    ///
    /// True when `target` exposes a (non-reserved) index equal to this
    /// error's, or a message textually equal to this error's. The cause
    /// chain is not consulted; see [`CausalError::has`] for that.
    #[must_use]
    pub fn is(&self, target: &ErrorValue) -> bool {
        if let Some(idx) = target.index() {
            if !idx.is_unknown() && idx == self.index {
                return true;
            }
        }
        matches!(target.message(), Some(msg) if msg == self.message)
    }

    /// Strict chain-membership test.
    ///
    /// True when any link of the causal chain *is identical to* `target`:
    /// index equality for indexed and registered targets, structural
    /// equality for registered targets without a usable index. A plain
    /// message target carries no identity and never matches.
    #[must_use]
    pub fn has(&self, target: &ErrorValue) -> bool {
        self.chain().any(|link| link.matches_identity(target))
    }

    fn matches_identity(&self, target: &ErrorValue) -> bool {
        match target {
            ErrorValue::Message(_) => false,
            ErrorValue::Indexed(idx) => !idx.is_unknown() && *idx == self.index,
            ErrorValue::Causal(c) => {
                if !c.index.is_unknown() && c.index == self.index {
                    return true;
                }
                **c == *self
            }
        }
    }
}

impl fmt::Display for CausalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let mut cause = self.cause.as_deref();
        while let Some(link) = cause {
            write!(f, ": {}", link.message)?;
            cause = link.cause.as_deref();
        }
        Ok(())
    }
}

impl std::error::Error for CausalError {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| &**c as &(dyn std::error::Error + 'static))
    }
}

/// Iterator over a causal chain, outermost error first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a CausalError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a CausalError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

/// The closed set of error shapes the registry and the chain queries
/// dispatch on.
///
/// Replaces runtime interface probing with an explicit tag: a value is a
/// plain message, a bare index handle, or a registered error with a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValue {
    /// Bare message text with no index and no cause.
    Message(String),
    /// A bare handle standing in for a registered error.
    ///
    /// Renders as `error <module>:<seq>`; resolve through the registry for
    /// the full `Module[<name>]: <message>` form.
    Indexed(Index),
    /// A registered error with its causal chain.
    Causal(Arc<CausalError>),
}

impl ErrorValue {
    /// The index this value exposes, if any.
    #[must_use]
    pub fn index(&self) -> Option<Index> {
        match self {
            ErrorValue::Message(_) => None,
            ErrorValue::Indexed(idx) => Some(*idx),
            ErrorValue::Causal(c) => Some(c.index()),
        }
    }

    /// The message text this value exposes, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorValue::Message(msg) => Some(msg),
            ErrorValue::Indexed(_) => None,
            ErrorValue::Causal(c) => Some(c.message()),
        }
    }

    /// The immediate cause, if this is a registered error with one.
    #[must_use]
    pub fn cause(&self) -> Option<&CausalError> {
        match self {
            ErrorValue::Causal(c) => c.cause(),
            _ => None,
        }
    }

    /// Typed downcast to the registered-error variant.
    #[must_use]
    pub fn as_causal(&self) -> Option<&Arc<CausalError>> {
        match self {
            ErrorValue::Causal(c) => Some(c),
            _ => None,
        }
    }

    /// Permissive shallow identity test; see [`CausalError::is`].
    #[must_use]
    pub fn is(&self, target: &ErrorValue) -> bool {
        match self {
            ErrorValue::Causal(c) => c.is(target),
            ErrorValue::Indexed(idx) => {
                !idx.is_unknown() && target.index() == Some(*idx)
            }
            ErrorValue::Message(msg) => {
                matches!(target.message(), Some(t) if t == msg.as_str())
            }
        }
    }

    /// Chain-membership test; see [`CausalError::has`].
    ///
    /// Values without a chain match only when identical to the target.
    #[must_use]
    pub fn has(&self, target: &ErrorValue) -> bool {
        match self {
            ErrorValue::Causal(c) => c.has(target),
            _ => self == target,
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorValue::Message(msg) => f.write_str(msg),
            ErrorValue::Indexed(idx) => write!(f, "error {idx}"),
            ErrorValue::Causal(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl std::error::Error for ErrorValue {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

impl From<&str> for ErrorValue {
    #[inline]
    fn from(msg: &str) -> Self {
        ErrorValue::Message(msg.to_string())
    }
}

impl From<String> for ErrorValue {
    #[inline]
    fn from(msg: String) -> Self {
        ErrorValue::Message(msg)
    }
}

impl From<Index> for ErrorValue {
    #[inline]
    fn from(idx: Index) -> Self {
        ErrorValue::Indexed(idx)
    }
}

impl From<CausalError> for ErrorValue {
    #[inline]
    fn from(err: CausalError) -> Self {
        ErrorValue::Causal(Arc::new(err))
    }
}

impl From<Arc<CausalError>> for ErrorValue {
    #[inline]
    fn from(err: Arc<CausalError>) -> Self {
        ErrorValue::Causal(err)
    }
}

/// True when `err` exposes a message textually equal to `text`.
#[must_use]
pub fn message_is(text: &str, err: &ErrorValue) -> bool {
    err.message() == Some(text)
}

/// True when `err` exposes exactly the index `idx`.
#[must_use]
pub fn index_is(idx: Index, err: &ErrorValue) -> bool {
    err.index() == Some(idx)
}
