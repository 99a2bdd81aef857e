//! Value types shared by every dibari crate.
//!
//! Nothing in here performs I/O. A [`SeriesIdentifier`] names one work on one
//! platform, a [`Bookmark`] names a reading position within it, and the
//! metadata types describe what a platform adapter knows about the series and
//! its chapters.

pub mod error;
pub mod models;
mod url;

pub use crate::models::{Action, Bookmark, ChapterMetadata, ContentRating, Pages, SeriesIdentifier, SeriesMetadata};
pub use crate::url::resolve_series_from_url;
