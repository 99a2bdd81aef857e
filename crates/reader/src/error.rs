//! Reader Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use dibari_filter::error::{Error as FilterError, ErrorKind as FilterErrorKind};
use dibari_platform::error::{Error as PlatformError, ErrorKind as PlatformErrorKind};
use dibari_store::error::{Error as StoreError, ErrorKind as StoreErrorKind};

/// A reader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The platform adapter failed.
    #[display("platform error: {_0}")]
    Platform(PlatformErrorKind),
    /// Content filters could not be evaluated. The content must not be shown.
    #[display("filter error: {_0}")]
    Filter(FilterErrorKind),
    /// Guild settings could not be read.
    #[display("settings error: {_0}")]
    Store(StoreErrorKind),
    /// The guild's content filters deny this series.
    #[display("series disallowed by server rules")]
    Disallowed,
    /// The URL doesn't point at any supported series.
    #[display("unsupported or invalid URL: {_0}")]
    UnsupportedUrl(#[error(not(source))] String),
    /// No URL was given and neither the channel nor the guild has a default.
    #[display("no default series has been set")]
    NoDefaultSeries,
    #[display("chapter {_0} not found")]
    ChapterNotFound(#[error(not(source))] String),
    /// `page` is one-based.
    #[display("page {page} doesn't exist in chapter {chapter}")]
    PageNotFound { chapter: String, page: u64 },
    /// The chapter exists but has no pages. Never skipped over.
    #[display("chapter {_0} has no pages")]
    EmptyChapter(#[error(not(source))] String),
    #[display("no results found for {_0:?}")]
    NoResults(#[error(not(source))] String),
}

impl ErrorKind {
    /// Raise a platform error into a reader error, keeping the platform
    /// crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn platform(err: PlatformError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Platform(inner))
    }

    #[track_caller]
    pub fn filter(err: FilterError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Filter(inner))
    }

    #[track_caller]
    pub fn store(err: StoreError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Store(inner))
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Platform(inner) => inner.is_retryable(),
            Self::Store(inner) => inner.is_retryable(),
            _ => false,
        }
    }

    /// Returns `true` if the error is the user's to fix, and should be shown
    /// to them as such rather than logged as a fault.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Platform(inner) => inner.is_user_error(),
            Self::Disallowed
            | Self::UnsupportedUrl(_)
            | Self::NoDefaultSeries
            | Self::ChapterNotFound(_)
            | Self::PageNotFound { .. }
            | Self::NoResults(_) => true,
            Self::Filter(_) | Self::Store(_) | Self::EmptyChapter(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_kind_is_preserved() {
        let err: PlatformError = exn::Exn::from(PlatformErrorKind::Transport("timed out".to_string()));
        let err = ErrorKind::platform(err);
        assert_eq!(*err, ErrorKind::Platform(PlatformErrorKind::Transport("timed out".to_string())));
        assert!(err.is_retryable());
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_filter_timeout_is_not_a_user_error() {
        let err = ErrorKind::filter(exn::Exn::from(FilterErrorKind::FilterTimeout));
        assert!(!err.is_user_error());
        assert!(!err.is_retryable());
    }
}
