//! Platform Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A platform error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The series or chapter does not exist upstream.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// No adapter is registered for the platform tag.
    #[display("unsupported platform: {_0}")]
    UnsupportedPlatform(#[error(not(source))] String),
    /// The upstream service could not be reached or answered with an error.
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// The upstream service answered with something we couldn't understand.
    #[display("invalid upstream data: {_0}")]
    InvalidData(#[error(not(source))] String),
    /// A chapter was found but contains no pages.
    #[display("chapter {_0} has no pages")]
    EmptyChapter(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if the error is the user's to fix (bad URL, chapter or
    /// platform), rather than a fault upstream.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnsupportedPlatform(_))
    }
}
