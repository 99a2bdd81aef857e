use dibari_model::{Action, Bookmark, ChapterMetadata, SeriesIdentifier, SeriesMetadata};
use dibari_platform::SearchResult;
use dibari_token::{NavigateState, SearchAction, SearchState};

/// Which reader controls lead nowhere and should be disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledControls {
    pub back_chapter: bool,
    pub back_page: bool,
    pub forward_page: bool,
    pub forward_chapter: bool,
}
impl DisabledControls {
    /// `last_page` is the zero-based index of the chapter's last page.
    pub fn new(page: u32, last_page: u32, has_previous_chapter: bool, has_next_chapter: bool) -> Self {
        Self {
            back_chapter: !has_previous_chapter,
            back_page: !has_previous_chapter && page == 0,
            forward_page: !has_next_chapter && page >= last_page,
            forward_chapter: !has_next_chapter,
        }
    }

    pub fn is_disabled(&self, action: Action) -> bool {
        match action {
            Action::Open => false,
            Action::BackPage => self.back_page,
            Action::ForwardPage => self.forward_page,
            Action::BackChapter => self.back_chapter,
            Action::ForwardChapter => self.forward_chapter,
        }
    }
}

/// Everything the presentation layer needs to show one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderPage {
    pub identifier: SeriesIdentifier,
    /// Anchored to the canonical chapter key.
    pub bookmark: Bookmark,
    pub chapter: ChapterMetadata,
    pub metadata: SeriesMetadata,
    /// Image to show, already rewritten through the image proxy if one is
    /// configured for the platform.
    pub page_url: String,
    pub page_count: usize,
    /// Scanlation group (or equivalent) credited for the chapter.
    pub group: String,
    /// Link to the page on the platform's own site.
    pub url: String,
    pub disabled: DisabledControls,
    /// The requested move had nowhere to go.
    pub end_of_content: bool,
}
impl ReaderPage {
    /// State for the control performing `action` from this page.
    pub fn state(&self, action: Action) -> NavigateState {
        NavigateState::new(action, self.identifier.clone(), self.bookmark.clone())
    }

    /// "Chapter 12 | Page 3/20"
    pub fn position(&self) -> String {
        format!("Chapter {} | Page {}/{}", self.bookmark.chapter, self.bookmark.page_number(), self.page_count)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub query: String,
    /// Zero-based.
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<SearchResult>,
}
impl SearchPage {
    pub fn back_disabled(&self) -> bool {
        self.page == 0
    }

    pub fn forward_disabled(&self) -> bool {
        self.page.saturating_add(1) >= self.total_pages
    }

    /// State for the back or forward button, with the page already moved.
    pub fn state(&self, action: SearchAction) -> SearchState {
        let page = match action {
            SearchAction::Search => 0,
            SearchAction::BackPage => self.page.saturating_sub(1),
            SearchAction::ForwardPage => self.page.saturating_add(1),
        };
        SearchState::new(action, self.query.clone(), page)
    }
}
