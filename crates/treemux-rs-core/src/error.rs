//! Core error types for treemux-rs.
//!
//! This module provides the error enum [`TreemuxError`] covering route
//! registration conflicts, malformed pattern errors, and the IO errors the
//! server glue can surface. Routing a request never produces an error: a
//! path that matches nothing is a `NotFound` disposition, not a failure.

use http::Method;
use thiserror::Error;

/// The primary error type for treemux-rs.
///
/// Registration errors are reported synchronously from the call that would
/// have introduced the conflict; the tree is never left with a silently
/// overwritten or ambiguous route.
#[derive(Error, Debug)]
pub enum TreemuxError {
    // ── Registration conflicts ───────────────────────────────────────

    /// A handler is already registered for this method and pattern.
    #[error("{method} {pattern} already has a handler")]
    HandlerConflict {
        /// The HTTP method of the rejected registration.
        method: Method,
        /// The pattern of the rejected registration.
        pattern: String,
    },

    /// A pattern reached a leaf whose wildcard names were bound differently
    /// by an earlier registration.
    #[error("wildcard names [{names}] in {pattern} are ambiguous with previously registered [{existing}]")]
    WildcardNameConflict {
        /// The pattern of the rejected registration.
        pattern: String,
        /// The wildcard names carried by the rejected registration.
        names: String,
        /// The wildcard names already bound at the leaf.
        existing: String,
    },

    /// A catch-all with a different name is already registered at this
    /// position.
    #[error("catch-all name in {pattern} conflicts with previously registered *{existing}")]
    CatchAllNameConflict {
        /// The pattern of the rejected registration.
        pattern: String,
        /// The catch-all name already present at the position.
        existing: String,
    },

    // ── Malformed patterns ───────────────────────────────────────────

    /// A catch-all segment was followed by more path.
    #[error("catch-all must be the final segment in {0}")]
    CatchAllNotLast(String),

    /// A `:` or `*` segment has no name.
    #[error("wildcard segment in {0} is missing a name")]
    MissingParameterName(String),

    /// The pattern does not begin with a slash.
    #[error("pattern {0:?} must begin with a slash")]
    MissingLeadingSlash(String),

    /// The pattern is empty.
    #[error("cannot register an empty pattern")]
    EmptyPattern,

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred while binding or serving.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreemuxError {
    /// Returns `true` for conflicts with an existing registration, `false`
    /// for patterns that are invalid on their own.
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::HandlerConflict { .. }
                | Self::WildcardNameConflict { .. }
                | Self::CatchAllNameConflict { .. }
        )
    }
}

/// A convenience type alias for `Result<T, TreemuxError>`.
pub type TreemuxResult<T> = Result<T, TreemuxError>;
