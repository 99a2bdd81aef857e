//! [MangaDex](https://mangadex.org) adapter.
//!
//! Series are addressed by manga UUID. Chapters are keyed by chapter number
//! (as listed by the aggregate endpoint for the configured language) and any
//! of a chapter's UUIDs resolve to that number.

mod schema;
mod search;

use self::schema::{AtHome, Aggregate, Chapter, Entity, Manga, relationship_names};
pub use self::search::{MangaDexSearch, SearchResult, SearchResults};
use crate::chapters::ChapterList;
use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Platform, PlatformHandle, Prototype};
use async_trait::async_trait;
use dibari_config::MangaDexConfig;
use dibari_model::{Bookmark, ChapterMetadata, Pages, SeriesIdentifier, SeriesMetadata};
use exn::OptionExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const NS_MANGA: &str = "mangadex.manga";
const NS_AGGREGATE: &str = "mangadex.aggregate";
const NS_CHAPTER: &str = "mangadex.chapter";
pub(crate) const NS_AT_HOME: &str = "mangadex.athome";
/// At-home server URLs stop working after about fifteen minutes.
pub(crate) const AT_HOME_TTL: Duration = Duration::from_secs(10 * 60);
const NO_GROUP: &str = "No Group";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaDexSettings {
    pub api_url: String,
    /// Link to a series, `{{ID}}` is replaced by the manga UUID.
    pub title_url: String,
    /// Link to a chapter page, `{{ID}}` is replaced by the chapter UUID and
    /// `{{PAGE}}` by the one-based page number.
    pub chapter_url: String,
    pub search_limit: u32,
    pub language: String,
}
impl From<&MangaDexConfig> for MangaDexSettings {
    fn from(config: &MangaDexConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            title_url: config.title_url.clone(),
            chapter_url: config.chapter_url.clone(),
            search_limit: config.search_limit,
            language: config.language.clone(),
        }
    }
}
impl Default for MangaDexSettings {
    fn default() -> Self {
        Self::from(&MangaDexConfig::default())
    }
}
impl MangaDexSettings {
    fn api(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url.trim_end_matches('/'))
    }

    pub fn title_link(&self, id: &str) -> String {
        self.title_url.replace("{{ID}}", id)
    }
}

pub struct MangaDexPrototype {
    fetcher: Fetcher,
    settings: Arc<MangaDexSettings>,
}
impl MangaDexPrototype {
    pub fn new(fetcher: Fetcher, settings: MangaDexSettings) -> Self {
        Self { fetcher, settings: Arc::new(settings) }
    }
}

#[async_trait]
impl Prototype for MangaDexPrototype {
    #[instrument(skip(self), fields(series = %identifier))]
    async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle> {
        let id = identifier.series().ok_or_raise(|| ErrorKind::NotFound(identifier.to_string()))?;
        let id = urlencoding::encode(id);
        let manga: Entity<Manga> = self
            .fetcher
            .get_json(NS_MANGA, &self.settings.api(&format!("manga/{id}?includes[]=author&includes[]=artist")))
            .await?;
        let aggregate: Aggregate = self
            .fetcher
            .get_json(
                NS_AGGREGATE,
                &self.settings.api(&format!(
                    "manga/{id}/aggregate?translatedLanguage[]={}",
                    urlencoding::encode(&self.settings.language)
                )),
            )
            .await?;

        let mut uuids = HashMap::new();
        let chapters = aggregate
            .volumes
            .into_values()
            .into_iter()
            .flat_map(|volume| volume.chapters.into_values())
            .map(|chapter| {
                uuids.entry(chapter.chapter.clone()).or_insert_with(|| chapter.id.clone());
                let mut aliases = vec![chapter.id];
                aliases.extend(chapter.others);
                (chapter.chapter, aliases)
            })
            .collect::<Vec<_>>();
        let chapters = ChapterList::new(chapters);
        debug!(chapters = chapters.keys().len(), "initialized");

        Ok(Arc::new(MangaDex {
            identifier: identifier.clone(),
            fetcher: self.fetcher.clone(),
            metadata: manga.data.metadata(&self.settings.language),
            settings: Arc::clone(&self.settings),
            chapters,
            uuids,
        }))
    }
}

struct MangaDex {
    identifier: SeriesIdentifier,
    fetcher: Fetcher,
    settings: Arc<MangaDexSettings>,
    metadata: SeriesMetadata,
    chapters: ChapterList,
    /// Canonical chapter key to the UUID used to fetch it.
    uuids: HashMap<String, String>,
}
impl MangaDex {
    fn resolve(&self, key: &str) -> Result<(&str, &str)> {
        let canonical = self.chapters.canonical(key).ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))?;
        let uuid = self
            .uuids
            .get(canonical)
            .map(String::as_str)
            .ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))?;
        Ok((canonical, uuid))
    }

    async fn chapter(&self, uuid: &str) -> Result<Chapter> {
        let url = self.settings.api(&format!("chapter/{}?includes[]=scanlation_group", urlencoding::encode(uuid)));
        let chapter: Entity<Chapter> = self.fetcher.get_json(NS_CHAPTER, &url).await?;
        Ok(chapter.data)
    }
}

#[async_trait]
impl Platform for MangaDex {
    fn identifier(&self) -> &SeriesIdentifier {
        &self.identifier
    }

    async fn metadata(&self) -> Result<SeriesMetadata> {
        Ok(self.metadata.clone())
    }

    async fn default_chapter(&self) -> Result<String> {
        self.chapters
            .first()
            .map(str::to_string)
            .ok_or_raise(|| ErrorKind::NotFound(format!("{} has no chapters", self.identifier)))
    }

    async fn has_chapter(&self, key: &str) -> Result<bool> {
        Ok(self.chapters.canonical(key).is_some())
    }

    async fn chapter_metadata(&self, key: &str) -> Result<ChapterMetadata> {
        let (canonical, uuid) = self.resolve(key)?;
        let chapter = self.chapter(uuid).await?;
        Ok(ChapterMetadata::new(canonical, chapter.attributes.title.unwrap_or_default()))
    }

    async fn pages(&self, chapter: &str) -> Result<Pages> {
        let (_, uuid) = self.resolve(chapter)?;
        let at_home: AtHome = self
            .fetcher
            .get_json(NS_AT_HOME, &self.settings.api(&format!("at-home/server/{}", urlencoding::encode(uuid))))
            .await?;
        let base = at_home.base_url.trim_end_matches('/');
        let urls = at_home
            .chapter
            .data
            .iter()
            .map(|file| format!("{base}/data/{}/{file}", at_home.chapter.hash))
            .collect();
        let group = relationship_names(&self.chapter(uuid).await?.relationships, "scanlation_group");
        Ok(Pages::new(urls, if group.is_empty() { NO_GROUP.to_string() } else { group }))
    }

    async fn previous_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        Ok(self.chapters.previous(chapter)?.map(str::to_string))
    }

    async fn next_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        Ok(self.chapters.next(chapter)?.map(str::to_string))
    }

    fn url(&self, bookmark: &Bookmark) -> String {
        match self.resolve(&bookmark.chapter) {
            Ok((_, uuid)) => self
                .settings
                .chapter_url
                .replace("{{ID}}", uuid)
                .replace("{{PAGE}}", &bookmark.page_number().to_string()),
            Err(_) => self.settings.title_link(self.identifier.series().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_cache::CachePool;

    const ID: &str = "a96676e5-8ae2-425e-b549-7f15dd34a6d8";
    const API: &str = "http://mangadex.invalid";

    fn settings() -> MangaDexSettings {
        MangaDexSettings { api_url: API.to_string(), ..Default::default() }
    }

    /// Pre-populates the response cache so that no request leaves the test.
    fn fetcher() -> Fetcher {
        let cache = Arc::new(CachePool::default());
        let fixtures = [
            (
                NS_MANGA,
                format!("{API}/manga/{ID}?includes[]=author&includes[]=artist"),
                r#"{"data": {"id": "a96676e5-8ae2-425e-b549-7f15dd34a6d8", "attributes": {
                    "title": {"en": "Komi Can't Communicate"}, "contentRating": "safe"
                }, "relationships": [{"id": "p", "type": "author", "attributes": {"name": "Oda Tomohito"}}]}}"#,
            ),
            (
                NS_AGGREGATE,
                format!("{API}/manga/{ID}/aggregate?translatedLanguage[]=en"),
                r#"{"volumes": {
                    "2": {"chapters": {"10": {"chapter": "10", "id": "uuid-10", "others": []}}},
                    "1": {"chapters": {
                        "2": {"chapter": "2", "id": "uuid-2", "others": ["uuid-2b"]},
                        "1": {"chapter": "1", "id": "uuid-1", "others": []}
                    }}
                }}"#,
            ),
            (
                NS_CHAPTER,
                format!("{API}/chapter/uuid-2?includes[]=scanlation_group"),
                r#"{"data": {"attributes": {"title": "Ordinary Person"},
                    "relationships": [{"id": "g", "type": "scanlation_group", "attributes": {"name": "Cafe"}}]}}"#,
            ),
            (
                NS_AT_HOME,
                format!("{API}/at-home/server/uuid-2"),
                r#"{"baseUrl": "https://node.example/", "chapter": {"hash": "h4sh", "data": ["1.png", "2.png"]}}"#,
            ),
        ];
        for (namespace, url, body) in fixtures {
            cache.set(namespace, url, body.to_string());
        }
        Fetcher::new("dibari-test", cache).unwrap()
    }

    async fn platform() -> PlatformHandle {
        MangaDexPrototype::new(fetcher(), settings())
            .initialize(&SeriesIdentifier::from(("mangadex", ID)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_chapters_are_ordered_numerically() {
        let platform = platform().await;
        assert_eq!(platform.default_chapter().await.unwrap(), "1");
        assert_eq!(platform.next_chapter_key("2").await.unwrap().as_deref(), Some("10"));
        assert_eq!(platform.previous_chapter_key("1").await.unwrap(), None);
        assert_eq!(platform.next_chapter_key("10").await.unwrap(), None);
        assert_eq!(platform.metadata().await.unwrap().author, "Oda Tomohito");
    }

    #[tokio::test]
    async fn test_uuid_alias_reanchors_to_chapter_number() {
        let platform = platform().await;
        assert!(platform.has_chapter("uuid-2b").await.unwrap());
        let chapter = platform.chapter_metadata("uuid-2b").await.unwrap();
        assert_eq!(chapter, ChapterMetadata::new("2", "Ordinary Person"));
        assert!(!platform.has_chapter("3").await.unwrap());
        let err = platform.chapter_metadata("3").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pages_from_at_home_server() {
        let platform = platform().await;
        let pages = platform.pages("2").await.unwrap();
        assert_eq!(pages.urls, ["https://node.example/data/h4sh/1.png", "https://node.example/data/h4sh/2.png"]);
        assert_eq!(pages.group, "Cafe");
    }

    #[tokio::test]
    async fn test_canonical_url() {
        let platform = platform().await;
        assert_eq!(platform.url(&Bookmark::new("2", 0)), "https://mangadex.org/chapter/uuid-2/1");
        assert_eq!(platform.url(&Bookmark::new("99", 0)), format!("https://mangadex.org/title/{ID}"));
    }
}
