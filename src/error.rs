//! CLI Error Types
//!
//! Every library crate reports its own `ErrorKind`; the CLI raises them into
//! one tree so `main` can decide how to report the failure.

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("{_0}")]
    Config(dibari_config::error::ErrorKind),
    #[display("{_0}")]
    Store(dibari_store::error::ErrorKind),
    #[display("{_0}")]
    Platform(dibari_platform::error::ErrorKind),
    #[display("{_0}")]
    Filter(dibari_filter::error::ErrorKind),
    #[display("{_0}")]
    Token(dibari_token::error::ErrorKind),
    #[display("{_0}")]
    Reader(dibari_reader::error::ErrorKind),
    /// The database directory could not be created.
    #[display("could not create data directory")]
    DataDirectory,
    #[display("{_0}")]
    InvalidArgument(#[error(not(source))] String),
}

/// Conversions from each library crate's error, keeping the library's `Exn`
/// frame as a child in the error tree.
impl ErrorKind {
    #[track_caller]
    pub fn config(err: dibari_config::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Config(inner))
    }

    #[track_caller]
    pub fn store(err: dibari_store::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Store(inner))
    }

    #[track_caller]
    pub fn platform(err: dibari_platform::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Platform(inner))
    }

    #[track_caller]
    pub fn filter(err: dibari_filter::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Filter(inner))
    }

    #[track_caller]
    pub fn token(err: dibari_token::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Token(inner))
    }

    #[track_caller]
    pub fn reader(err: dibari_reader::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Reader(inner))
    }
}

impl ErrorKind {
    /// Returns `true` if the failure is down to what the user asked for, so
    /// the error tree isn't worth showing.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Reader(inner) => inner.is_user_error(),
            Self::Platform(inner) => inner.is_user_error(),
            Self::Store(dibari_store::error::ErrorKind::FilterNotFound(_)) => true,
            Self::Filter(dibari_filter::error::ErrorKind::InvalidPattern(_))
            | Self::Filter(dibari_filter::error::ErrorKind::InvalidFilter(_)) => true,
            Self::Token(_) | Self::InvalidArgument(_) => true,
            _ => false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reader(inner) => inner.is_retryable(),
            Self::Platform(inner) => inner.is_retryable(),
            Self::Store(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
