use std::fmt::{Display, Formatter, Result as FmtResult};

/// What the reader asked to do from its current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    /// Show the bookmark as-is.
    #[default]
    Open,
    BackPage,
    ForwardPage,
    BackChapter,
    ForwardChapter,
}
impl Action {
    /// `(chapter_delta, page_delta)` for the navigation engine.
    pub fn deltas(&self) -> (i8, i8) {
        match self {
            Action::Open => (0, 0),
            Action::BackPage => (0, -1),
            Action::ForwardPage => (0, 1),
            Action::BackChapter => (-1, 0),
            Action::ForwardChapter => (1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Open => "open",
            Action::BackPage => "back page",
            Action::ForwardPage => "forward page",
            Action::BackChapter => "back chapter",
            Action::ForwardChapter => "forward chapter",
        }
    }
}
impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
