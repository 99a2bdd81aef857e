//! Filter Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A filter error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for filter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Evaluation ran over its time budget. The content must be treated as
    /// denied.
    #[display("filter evaluation exceeded its time budget")]
    FilterTimeout,
    /// The pattern is not a valid regular expression (or is too large to
    /// compile).
    #[display("invalid filter pattern: {_0}")]
    InvalidPattern(#[error(not(source))] String),
    /// The filter is incomplete or inconsistent.
    #[display("invalid filter: {_0}")]
    InvalidFilter(#[error(not(source))] String),
    /// A stored discriminant doesn't map to any known variant.
    #[display("unknown {field}: {value}")]
    UnknownDiscriminant {
        /// The enum being decoded.
        field: &'static str,
        /// The offending value.
        value: i64,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A timeout depends on load, but retrying a possibly malicious
        // pattern is exactly what the budget exists to prevent.
        false
    }
}
