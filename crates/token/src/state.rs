use crate::InteractionType;
use dibari_model::{Action, Bookmark, SeriesIdentifier};

/// Where a search interaction came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchAction {
    /// A new search.
    #[default]
    Search,
    BackPage,
    ForwardPage,
}

/// Tab of the debug view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DebugPage {
    #[default]
    Main = 0,
    Cache = 1,
}
impl DebugPage {
    pub fn from_discriminant(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Main),
            1 => Some(Self::Cache),
            _ => None,
        }
    }
}

/// A reader button: the position it was pressed at and what it asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateState {
    pub action: Action,
    pub identifier: SeriesIdentifier,
    pub bookmark: Bookmark,
}
impl NavigateState {
    pub fn new(action: Action, identifier: SeriesIdentifier, bookmark: Bookmark) -> Self {
        Self { action, identifier, bookmark }
    }
}

/// A search button. `page` is the zero-based page to show, with the action
/// already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub action: SearchAction,
    pub query: String,
    pub page: u32,
}
impl SearchState {
    pub fn new(action: SearchAction, query: impl Into<String>, page: u32) -> Self {
        Self { action, query: query.into(), page }
    }
}

/// Everything a token can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Navigate(NavigateState),
    Search(SearchState),
    SelectManga { manga_id: String },
    DebugSwitch(DebugPage),
}
impl State {
    pub fn interaction_type(&self) -> InteractionType {
        match self {
            Self::Navigate(state) => match state.action {
                Action::BackPage => InteractionType::MangaBackPage,
                Action::ForwardPage => InteractionType::MangaForwardPage,
                Action::BackChapter => InteractionType::MangaBackChapter,
                Action::ForwardChapter => InteractionType::MangaForwardChapter,
                Action::Open => InteractionType::MangaOpen,
            },
            Self::Search(state) => match state.action {
                SearchAction::Search => InteractionType::SearchForManga,
                SearchAction::BackPage => InteractionType::SearchBackPage,
                SearchAction::ForwardPage => InteractionType::SearchForwardPage,
            },
            Self::SelectManga { .. } => InteractionType::SearchSelectManga,
            Self::DebugSwitch(_) => InteractionType::DebugSwitchPage,
        }
    }
}
