use crate::error::{ErrorKind, Result};
use dibari_model::Bookmark;
use dibari_platform::Platform;
use tracing::{instrument, trace};

/// Where a navigation step ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved(Bookmark),
    /// There was nothing further in the requested direction. The bookmark is
    /// clamped to the nearest valid position and is still safe to show.
    EndOfContent(Bookmark),
}
impl Navigation {
    pub fn bookmark(&self) -> &Bookmark {
        match self {
            Self::Moved(bookmark) | Self::EndOfContent(bookmark) => bookmark,
        }
    }

    pub fn into_bookmark(self) -> Bookmark {
        match self {
            Self::Moved(bookmark) | Self::EndOfContent(bookmark) => bookmark,
        }
    }

    pub fn is_end_of_content(&self) -> bool {
        matches!(self, Self::EndOfContent(_))
    }
}

/// Number of pages in `chapter`, which is never zero.
async fn page_count(platform: &dyn Platform, chapter: &str) -> Result<u32> {
    let pages = platform.pages(chapter).await.map_err(ErrorKind::platform)?;
    match pages.last_index() {
        Some(last) => Ok(last + 1),
        None => exn::bail!(ErrorKind::EmptyChapter(chapter.to_string())),
    }
}

/// Moves `bookmark` by one chapter or one page.
///
/// Only the sign of each delta matters. A chapter step takes precedence over a
/// page step and always lands on the first page of the target chapter. A page
/// step that runs off either end of the chapter crosses into the adjacent
/// chapter: forwards onto its first page, backwards onto its **last** page,
/// so that paging backwards reads the previous chapter from its end.
///
/// `bookmark.chapter` must already be a canonical chapter key.
#[instrument(level = "debug", skip(platform), fields(series = %platform.identifier()))]
pub async fn navigate(
    platform: &dyn Platform,
    bookmark: &Bookmark,
    chapter_delta: i8,
    page_delta: i8,
) -> Result<Navigation> {
    let navigation = match (chapter_delta.signum(), page_delta.signum()) {
        (1, _) => match platform.next_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)? {
            Some(next) => Navigation::Moved(Bookmark::new(next, 0)),
            None => Navigation::EndOfContent(bookmark.clone()),
        },
        (-1, _) => match platform.previous_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)? {
            Some(previous) => Navigation::Moved(Bookmark::new(previous, 0)),
            None => Navigation::EndOfContent(bookmark.clone()),
        },
        (_, 0) => Navigation::Moved(bookmark.clone()),
        (_, 1) => {
            let count = page_count(platform, &bookmark.chapter).await?;
            match bookmark.page.checked_add(1).filter(|page| *page < count) {
                Some(page) => Navigation::Moved(bookmark.with_page(page)),
                None => match platform.next_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)? {
                    Some(next) => Navigation::Moved(Bookmark::new(next, 0)),
                    None => Navigation::EndOfContent(bookmark.with_page(count - 1)),
                },
            }
        },
        (_, _) => {
            let count = page_count(platform, &bookmark.chapter).await?;
            match bookmark.page.checked_sub(1).filter(|page| *page < count) {
                Some(page) => Navigation::Moved(bookmark.with_page(page)),
                None => match platform.previous_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)? {
                    Some(previous) => {
                        let last = page_count(platform, &previous).await? - 1;
                        Navigation::Moved(Bookmark::new(previous, last))
                    },
                    None => Navigation::EndOfContent(bookmark.with_page(0)),
                },
            }
        },
    };
    trace!(from = %bookmark, to = %navigation.bookmark(), end_of_content = navigation.is_end_of_content(), "navigated");
    Ok(navigation)
}
