use crate::error::{ErrorKind, Result};
use crate::{DisabledControls, GuildSettings, ImageProxy, ReaderPage, navigate};
use dibari_filter::FilterEngine;
use dibari_model::{Action, Bookmark, ChapterMetadata, SeriesIdentifier, SeriesMetadata, resolve_series_from_url};
use dibari_platform::{Platform, Registry};
use dibari_token::NavigateState;
use exn::OptionExt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Platform tag that search results (and the select-manga interaction) open.
const SEARCH_PLATFORM: &str = "mangadex";

/// Turns reader requests into pages to show.
///
/// Every request stands alone: the whole reading position travels in the
/// request's [`NavigateState`], and the only shared state is the response
/// cache behind the platform adapters.
#[derive(Clone)]
pub struct Reader {
    registry: Registry,
    settings: Arc<dyn GuildSettings>,
    engine: Arc<FilterEngine>,
    proxy: Option<ImageProxy>,
}
impl Reader {
    pub fn new(registry: Registry, settings: Arc<dyn GuildSettings>) -> Self {
        Self { registry, settings, engine: Arc::new(FilterEngine::default()), proxy: None }
    }

    pub fn with_engine(mut self, engine: FilterEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_proxy(mut self, proxy: ImageProxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Opens a series from a URL, or the channel's default series when `url`
    /// is blank. An empty `chapter` opens the platform's default chapter, and
    /// `page_number` is one-based.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        guild_id: u64,
        channel_id: u64,
        url: Option<&str>,
        chapter: &str,
        page_number: u32,
    ) -> Result<ReaderPage> {
        let url = match url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => url.to_string(),
            None => self
                .settings
                .default_series(guild_id, channel_id)
                .await?
                .ok_or_raise(|| ErrorKind::NoDefaultSeries)?,
        };
        let identifier = resolve_series_from_url(&url);
        if identifier.is_unresolved() {
            exn::bail!(ErrorKind::UnsupportedUrl(url));
        }
        let state = NavigateState::new(Action::Open, identifier, Bookmark::from_page_number(chapter, page_number));
        self.read(guild_id, channel_id, &state).await
    }

    /// Opens a MangaDex search result at its default chapter.
    pub async fn select_manga(&self, guild_id: u64, channel_id: u64, manga_id: &str) -> Result<ReaderPage> {
        let identifier = SeriesIdentifier::new(SEARCH_PLATFORM.to_string(), manga_id.to_string());
        let state = NavigateState::new(Action::Open, identifier, Bookmark::default());
        self.read(guild_id, channel_id, &state).await
    }

    /// Applies the state's action to its bookmark and returns the resulting
    /// page.
    ///
    /// In guilds (`guild_id != 0`) the series must first pass the channel's
    /// content filters; a filter that can't be evaluated denies the series.
    #[instrument(skip(self, state), fields(series = %state.identifier, bookmark = %state.bookmark, action = %state.action))]
    pub async fn read(&self, guild_id: u64, channel_id: u64, state: &NavigateState) -> Result<ReaderPage> {
        let platform = self.registry.initialize(&state.identifier).await.map_err(ErrorKind::platform)?;
        let metadata = platform.metadata().await.map_err(ErrorKind::platform)?;

        if guild_id != 0 {
            let filters = self.settings.filters(guild_id, channel_id).await?;
            let allowed = self
                .engine
                .is_allowed(guild_id, channel_id, &metadata, platform.identifier(), &filters)
                .map_err(ErrorKind::filter)?;
            if !allowed {
                exn::bail!(ErrorKind::Disallowed);
            }
        }

        let chapter = match state.bookmark.chapter.as_str() {
            "" => platform.default_chapter().await.map_err(ErrorKind::platform)?,
            chapter => chapter.to_string(),
        };
        if !platform.has_chapter(&chapter).await.map_err(ErrorKind::platform)? {
            exn::bail!(ErrorKind::ChapterNotFound(chapter));
        }
        // Chapter keys may be aliases; navigation works on canonical keys.
        let anchored = platform.chapter_metadata(&chapter).await.map_err(ErrorKind::platform)?;
        let bookmark = Bookmark::new(anchored.id, state.bookmark.page);

        let (chapter_delta, page_delta) = state.action.deltas();
        let navigation = navigate(platform.as_ref(), &bookmark, chapter_delta, page_delta).await?;
        let end_of_content = navigation.is_end_of_content();
        let bookmark = navigation.into_bookmark();

        let chapter = platform.chapter_metadata(&bookmark.chapter).await.map_err(ErrorKind::platform)?;
        let bookmark = bookmark.with_chapter(chapter.id.as_str());
        debug!(%bookmark, end_of_content, "read");
        self.render(platform.as_ref(), bookmark, chapter, metadata, end_of_content).await
    }

    async fn render(
        &self,
        platform: &dyn Platform,
        bookmark: Bookmark,
        chapter: ChapterMetadata,
        metadata: SeriesMetadata,
        end_of_content: bool,
    ) -> Result<ReaderPage> {
        let pages = platform.pages(&bookmark.chapter).await.map_err(ErrorKind::platform)?;
        let last_page = pages.last_index().ok_or_raise(|| ErrorKind::EmptyChapter(bookmark.chapter.clone()))?;
        let image = pages
            .get(bookmark.page)
            .ok_or_raise(|| ErrorKind::PageNotFound { chapter: bookmark.chapter.clone(), page: bookmark.page_number() })?;

        let identifier = platform.identifier().clone();
        let page_url = match (&self.proxy, identifier.platform()) {
            (Some(proxy), Some(tag)) => proxy.rewrite(image, tag).into_owned(),
            _ => image.to_string(),
        };
        let has_previous = platform.previous_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)?.is_some();
        let has_next = platform.next_chapter_key(&bookmark.chapter).await.map_err(ErrorKind::platform)?.is_some();

        Ok(ReaderPage {
            url: platform.url(&bookmark),
            disabled: DisabledControls::new(bookmark.page, last_page, has_previous, has_next),
            page_count: pages.len(),
            group: pages.group,
            identifier,
            bookmark,
            chapter,
            metadata,
            page_url,
            end_of_content,
        })
    }
}
