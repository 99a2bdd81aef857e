//! In-memory platform for testing.

use crate::error::{ErrorKind, Result};
use crate::{Platform, PlatformHandle, Prototype};
use async_trait::async_trait;
use dibari_model::{Bookmark, ChapterMetadata, Pages, SeriesIdentifier, SeriesMetadata};
use exn::OptionExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockChapter {
    pub id: String,
    pub title: String,
    pub pages: Vec<String>,
}

/// In-memory platform for testing.
///
/// Chapters are ordered as they were added. Every trait method call is
/// counted, so tests can assert on how much upstream traffic an operation
/// would have caused. Clones share their call counters, which lets a test
/// keep a handle to the mock after registering it as a [`Prototype`].
///
/// # Examples
///
/// ```
/// use dibari_model::SeriesIdentifier;
/// use dibari_platform::Platform;
/// use dibari_platform::platform::MockPlatform;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let platform = MockPlatform::new(SeriesIdentifier::from(("mock", "series")))
///     .with_chapter("1", "Beginnings", 3)
///     .with_chapter("2", "Endings", 1);
/// assert_eq!(platform.next_chapter_key("1").await?.as_deref(), Some("2"));
/// assert_eq!(platform.calls("next_chapter_key"), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MockPlatform {
    identifier: SeriesIdentifier,
    metadata: SeriesMetadata,
    chapters: Vec<MockChapter>,
    aliases: HashMap<String, String>,
    default_chapter: Option<String>,
    group: String,
    calls: Arc<Mutex<HashMap<&'static str, usize>>>,
}

impl MockPlatform {
    pub fn new(identifier: SeriesIdentifier) -> Self {
        Self {
            identifier,
            metadata: SeriesMetadata::default(),
            chapters: Vec::new(),
            aliases: HashMap::new(),
            default_chapter: None,
            group: "Mock Scans".to_string(),
            calls: Arc::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: SeriesMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Adds a chapter with `page_count` generated page URLs.
    pub fn with_chapter(self, id: &str, title: &str, page_count: usize) -> Self {
        let pages = (1..=page_count).map(|n| format!("https://mock.invalid/{id}/{n}.png")).collect();
        self.with_pages(id, title, pages)
    }

    pub fn with_pages(mut self, id: &str, title: &str, pages: Vec<String>) -> Self {
        self.chapters.push(MockChapter { id: id.to_string(), title: title.to_string(), pages });
        self
    }

    pub fn with_alias(mut self, alias: &str, id: &str) -> Self {
        self.aliases.insert(alias.to_string(), id.to_string());
        self
    }

    /// Overrides the default chapter, which is otherwise the first one added.
    pub fn with_default_chapter(mut self, id: &str) -> Self {
        self.default_chapter = Some(id.to_string());
        self
    }

    /// Number of calls made to the named trait method.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner).entry(method).or_default() += 1;
    }

    fn position(&self, key: &str) -> Option<usize> {
        let canonical = self.aliases.get(key).map(String::as_str).unwrap_or(key);
        self.chapters.iter().position(|chapter| chapter.id == canonical)
    }

    fn require(&self, key: &str) -> Result<usize> {
        self.position(key).ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn identifier(&self) -> &SeriesIdentifier {
        &self.identifier
    }

    async fn metadata(&self) -> Result<SeriesMetadata> {
        self.record("metadata");
        Ok(self.metadata.clone())
    }

    async fn default_chapter(&self) -> Result<String> {
        self.record("default_chapter");
        self.default_chapter
            .clone()
            .or_else(|| self.chapters.first().map(|chapter| chapter.id.clone()))
            .ok_or_raise(|| ErrorKind::NotFound(format!("{} has no chapters", self.identifier)))
    }

    async fn has_chapter(&self, key: &str) -> Result<bool> {
        self.record("has_chapter");
        Ok(self.position(key).is_some())
    }

    async fn chapter_metadata(&self, key: &str) -> Result<ChapterMetadata> {
        self.record("chapter_metadata");
        let chapter = &self.chapters[self.require(key)?];
        Ok(ChapterMetadata::new(chapter.id.clone(), chapter.title.clone()))
    }

    async fn pages(&self, chapter: &str) -> Result<Pages> {
        self.record("pages");
        let chapter = &self.chapters[self.require(chapter)?];
        Ok(Pages::new(chapter.pages.clone(), self.group.clone()))
    }

    async fn previous_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        self.record("previous_chapter_key");
        let index = self.require(chapter)?;
        Ok(index.checked_sub(1).map(|previous| self.chapters[previous].id.clone()))
    }

    async fn next_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        self.record("next_chapter_key");
        let index = self.require(chapter)?;
        Ok(self.chapters.get(index + 1).map(|next| next.id.clone()))
    }

    fn url(&self, bookmark: &Bookmark) -> String {
        format!("https://mock.invalid/{}/{}/{}", self.identifier, bookmark.chapter, bookmark.page_number())
    }
}

#[async_trait]
impl Prototype for MockPlatform {
    async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle> {
        self.record("initialize");
        if identifier.series() != self.identifier.series() {
            exn::bail!(ErrorKind::NotFound(identifier.to_string()));
        }
        Ok(Arc::new(self.clone()))
    }
}
