//! Platform trait and implementations.
//!
//! This module defines the [`Platform`] trait, which provides a unified
//! navigation interface over every supported manga source, and the
//! [`Prototype`] trait that produces initialized adapters for a series.

pub mod cubari;
pub mod mangadex;
#[cfg(feature = "mock")]
mod mock;
pub mod xkcd;

#[cfg(feature = "mock")]
pub use self::mock::{MockChapter, MockPlatform};
use crate::PlatformHandle;
use crate::error::Result;
use async_trait::async_trait;
use dibari_model::{Bookmark, ChapterMetadata, Pages, SeriesIdentifier, SeriesMetadata};

/// Unified interface for an initialized series on one platform.
///
/// Chapters are addressed by *keys*. Each platform has one canonical key per
/// chapter (the one returned in [`ChapterMetadata::id`]) but may accept other
/// aliases for it, for example a MangaDex chapter UUID instead of its chapter
/// number, or `"0327"` instead of `"327"` for xkcd. Callers should re-anchor
/// onto the canonical key via [`chapter_metadata()`](Self::chapter_metadata)
/// before navigating.
///
/// # Examples
///
/// ```
/// use dibari_platform::Platform;
/// use dibari_platform::error::Result;
///
/// async fn first_page(platform: &dyn Platform) -> Result<Option<String>> {
///     let chapter = platform.default_chapter().await?;
///     let pages = platform.pages(&chapter).await?;
///     Ok(pages.urls.first().cloned())
/// }
/// ```
#[async_trait]
pub trait Platform: Send + Sync {
    /// The series this adapter was initialized for.
    fn identifier(&self) -> &SeriesIdentifier;

    async fn metadata(&self) -> Result<SeriesMetadata>;

    /// Key of the chapter to open when the caller doesn't name one. This is
    /// the first chapter for most platforms and the latest one for
    /// webcomics.
    async fn default_chapter(&self) -> Result<String>;

    /// Whether `key` (canonical or alias) names a chapter of this series.
    async fn has_chapter(&self, key: &str) -> Result<bool>;

    /// Metadata for the chapter named by `key`, carrying its canonical key.
    async fn chapter_metadata(&self, key: &str) -> Result<ChapterMetadata>;

    /// Ordered page image URLs for a chapter. A chapter without pages is
    /// returned as-is; deciding what an empty chapter means is up to the
    /// caller.
    async fn pages(&self, chapter: &str) -> Result<Pages>;

    /// Key of the chapter before `chapter`, or `None` at the first chapter.
    async fn previous_chapter_key(&self, chapter: &str) -> Result<Option<String>>;

    /// Key of the chapter after `chapter`, or `None` at the last chapter.
    async fn next_chapter_key(&self, chapter: &str) -> Result<Option<String>>;

    /// Link to the bookmarked page on the platform's own website.
    fn url(&self, bookmark: &Bookmark) -> String;
}

/// Produces [`Platform`] adapters for series of one platform.
///
/// Initialization fetches whatever the adapter needs up front (series
/// metadata, the chapter list) so that the returned handle can answer
/// navigation questions cheaply.
#[async_trait]
pub trait Prototype: Send + Sync {
    async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle>;
}
