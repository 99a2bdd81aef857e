use std::fmt::{Display, Formatter, Result as FmtResult};

/// A reading position: a provider-native chapter key and a zero-based page.
///
/// Chapter keys are opaque. They are not guaranteed to be numeric, nor to sort
/// correctly as strings; only the platform adapter knows chapter order. An
/// empty chapter key asks the adapter for its default chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bookmark {
    pub chapter: String,
    pub page: u32,
}
impl Bookmark {
    pub fn new(chapter: impl Into<String>, page: u32) -> Self {
        Self { chapter: chapter.into(), page }
    }

    /// Builds a bookmark from a one-based page number, as typed by a user.
    /// Page numbers below one are clamped to the first page.
    pub fn from_page_number(chapter: impl Into<String>, page_number: u32) -> Self {
        Self::new(chapter, page_number.saturating_sub(1))
    }

    /// One-based page number for display.
    pub fn page_number(&self) -> u64 {
        u64::from(self.page) + 1
    }

    /// The same position re-anchored to a (canonical) chapter key.
    pub fn with_chapter(&self, chapter: impl Into<String>) -> Self {
        Self::new(chapter, self.page)
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self::new(self.chapter.clone(), page)
    }
}
impl Display for Bookmark {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "chapter {} page {}", self.chapter, self.page_number())
    }
}
