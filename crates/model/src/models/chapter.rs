/// Chapter details as reported by a platform adapter.
///
/// The `id` is the canonical chapter key, which may differ from the key the
/// caller asked about when the platform knows a chapter under several aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ChapterMetadata {
    pub id: String,
    pub title: String,
}
impl ChapterMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }

    /// The chapter title, or a generated one when the platform has none.
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() { format!("Chapter {}", self.id) } else { self.title.clone() }
    }
}

/// Ordered page image URLs for one chapter, plus the group that published them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pages {
    pub urls: Vec<String>,
    pub group: String,
}
impl Pages {
    pub fn new(urls: Vec<String>, group: impl Into<String>) -> Self {
        Self { urls, group: group.into() }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Zero-based index of the final page, `None` for an empty chapter.
    pub fn last_index(&self) -> Option<u32> {
        self.urls.len().checked_sub(1).map(|last| u32::try_from(last).unwrap_or(u32::MAX))
    }

    pub fn get(&self, page: u32) -> Option<&str> {
        usize::try_from(page).ok().and_then(|page| self.urls.get(page)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_id() {
        assert_eq!(ChapterMetadata::new("12", "").display_title(), "Chapter 12");
        assert_eq!(ChapterMetadata::new("12", "  ").display_title(), "Chapter 12");
        assert_eq!(ChapterMetadata::new("12", "The End").display_title(), "The End");
    }

    #[test]
    fn test_last_index() {
        assert_eq!(Pages::default().last_index(), None);
        let pages = Pages::new(vec!["a".into(), "b".into(), "c".into()], "group");
        assert_eq!(pages.last_index(), Some(2));
        assert_eq!(pages.get(2), Some("c"));
        assert_eq!(pages.get(3), None);
    }
}
