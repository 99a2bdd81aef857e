//! Token Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A token error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The encoded state doesn't fit; the caller must shorten it.
    #[display("token is {length} characters long, the limit is {max}")]
    TooLong {
        /// Length of the rejected token, in characters.
        length: usize,
        /// The configured ceiling.
        max: usize,
    },
    /// A field contains the delimiter and could not be decoded again.
    #[display("field '{_0}' contains the token delimiter")]
    InvalidField(#[error(not(source))] &'static str),
    /// The token is not something this codec produced. Reject the
    /// interaction without acting on any part of it.
    #[display("malformed token: {_0}")]
    MalformedToken(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
