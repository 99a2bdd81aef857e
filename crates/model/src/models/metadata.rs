use super::ContentRating;
use std::collections::BTreeSet;

/// Series-level details, used both for display and as the field set that
/// guild content filters are evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub title: String,
    pub author: String,
    pub artist: String,
    pub description: String,
    /// Ordered so that joined output (and therefore filter input) is stable.
    pub tags: BTreeSet<String>,
    pub content_rating: ContentRating,
}
impl SeriesMetadata {
    /// Tags joined with commas, the form content filters see.
    pub fn joined_tags(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }
}
