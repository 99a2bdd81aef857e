//! [Cubari](https://cubari.moe) adapter.
//!
//! Cubari proxies galleries from several hosts (imgur, gist, reddit, imgchest
//! and weebcentral) into one series format, so a single adapter serves every
//! one of those platform tags. The series endpoint returns the full chapter
//! map up front; each chapter's page list is either inlined or served from a
//! separate proxy endpoint.

use crate::chapters::ChapterList;
use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Platform, PlatformHandle, Prototype};
use async_trait::async_trait;
use dibari_model::{Bookmark, ChapterMetadata, ContentRating, Pages, SeriesIdentifier, SeriesMetadata};
use exn::OptionExt;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

const NS_SERIES: &str = "cubari.series";
const NS_PAGES: &str = "cubari.pages";
/// Platform tags served through Cubari.
pub const PLATFORMS: &[&str] = &["imgur", "gist", "reddit", "imgchest", "weebcentral"];

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    groups: HashMap<String, String>,
    #[serde(default)]
    chapters: BTreeMap<String, Chapter>,
}

#[derive(Debug, Deserialize)]
struct Chapter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    groups: BTreeMap<String, GroupPages>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum GroupPages {
    Inline(Vec<PageSource>),
    /// Path (relative to the Cubari host) of an endpoint returning the pages.
    Proxy(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PageSource {
    Url(String),
    Image { src: String },
}
impl PageSource {
    fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Image { src: url } => url,
        }
    }
}

pub struct CubariPrototype {
    fetcher: Fetcher,
    base_url: String,
}
impl CubariPrototype {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into().trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl Prototype for CubariPrototype {
    #[instrument(skip(self), fields(series = %identifier))]
    async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle> {
        let (Some(platform), Some(series)) = (identifier.platform(), identifier.series()) else {
            exn::bail!(ErrorKind::NotFound(identifier.to_string()));
        };
        let url = format!(
            "{}/read/api/{}/series/{}/",
            self.base_url,
            urlencoding::encode(platform),
            urlencoding::encode(series)
        );
        let series: Series = self.fetcher.get_json(NS_SERIES, &url).await?;
        // Chapter "1.5" appears as "1-5" in Cubari reader URLs.
        let chapters = ChapterList::new(series.chapters.keys().map(|key| (key.clone(), vec![key.replace('.', "-")])));
        debug!(chapters = chapters.keys().len(), "initialized");

        let metadata = SeriesMetadata {
            title: series.title.unwrap_or_default(),
            author: series.author.unwrap_or_default(),
            artist: series.artist.unwrap_or_default(),
            description: series.description.unwrap_or_default(),
            tags: Default::default(),
            content_rating: ContentRating::Unknown,
        };
        Ok(Arc::new(Cubari {
            identifier: identifier.clone(),
            fetcher: self.fetcher.clone(),
            base_url: self.base_url.clone(),
            metadata,
            chapters,
            entries: series.chapters,
            groups: series.groups,
        }))
    }
}

struct Cubari {
    identifier: SeriesIdentifier,
    fetcher: Fetcher,
    base_url: String,
    metadata: SeriesMetadata,
    chapters: ChapterList,
    entries: BTreeMap<String, Chapter>,
    /// Group ID to display name.
    groups: HashMap<String, String>,
}
impl Cubari {
    fn resolve(&self, key: &str) -> Result<(&str, &Chapter)> {
        self.chapters
            .canonical(key)
            .and_then(|canonical| Some((canonical, self.entries.get(canonical)?)))
            .ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))
    }
}

#[async_trait]
impl Platform for Cubari {
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
        Ok(self.resolve(key).is_ok())
    }

    async fn chapter_metadata(&self, key: &str) -> Result<ChapterMetadata> {
        let (canonical, chapter) = self.resolve(key)?;
        Ok(ChapterMetadata::new(canonical, chapter.title.clone().unwrap_or_default()))
    }

    async fn pages(&self, chapter: &str) -> Result<Pages> {
        let (canonical, entry) = self.resolve(chapter)?;
        let Some((group, pages)) = lowest_group(&entry.groups) else {
            return Ok(Pages::new(Vec::new(), ""));
        };
        let sources = match pages {
            GroupPages::Inline(sources) => sources.clone(),
            GroupPages::Proxy(path) => {
                debug!(chapter = canonical, path, "fetching proxied page list");
                self.fetcher.get_json(NS_PAGES, &format!("{}{path}", self.base_url)).await?
            },
        };
        let name = self.groups.get(group).cloned().unwrap_or_else(|| group.clone());
        Ok(Pages::new(sources.into_iter().map(PageSource::into_url).collect(), name))
    }

    async fn previous_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        Ok(self.chapters.previous(chapter)?.map(str::to_string))
    }

    async fn next_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        Ok(self.chapters.next(chapter)?.map(str::to_string))
    }

    fn url(&self, bookmark: &Bookmark) -> String {
        let platform = self.identifier.platform().unwrap_or_default();
        let series = self.identifier.series().unwrap_or_default();
        match self.chapters.canonical(&bookmark.chapter) {
            Some(chapter) => format!(
                "{}/read/{platform}/{series}/{}/{}/",
                self.base_url,
                chapter.replace('.', "-"),
                bookmark.page_number()
            ),
            None => format!("{}/read/{platform}/{series}/", self.base_url),
        }
    }
}

/// The group with the lowest numeric ID. IDs are JSON object keys, so "10"
/// must not sort before "2"; non-numeric IDs come last.
fn lowest_group(groups: &BTreeMap<String, GroupPages>) -> Option<(&String, &GroupPages)> {
    groups.iter().min_by_key(|(id, _)| (id.parse::<u64>().unwrap_or(u64::MAX), id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_cache::CachePool;

    const BASE: &str = "http://cubari.invalid";

    async fn platform() -> PlatformHandle {
        let cache = Arc::new(CachePool::default());
        cache.set(
            NS_SERIES,
            format!("{BASE}/read/api/gist/series/abc123/"),
            r#"{
                "title": "Gist Series", "author": "Someone", "artist": "Someone Else",
                "groups": {"1": "Scanlators", "2": "Early Birds", "10": "Latecomers"},
                "chapters": {
                    "2": {"title": "Second", "groups": {"1": "/proxy/api/imgur/chapter/xyz/"}},
                    "1.5": {"title": "Interlude", "groups": {"1": [{"src": "https://i.example/a.png"}]}},
                    "1": {"title": "", "groups": {"1": ["https://i.example/1.png", "https://i.example/2.png"]}},
                    "3": {"title": "Empty", "groups": {}},
                    "4": {"title": "Contested", "groups": {
                        "10": ["https://i.example/late.png"],
                        "2": ["https://i.example/early.png"]
                    }}
                }
            }"#
            .to_string(),
        );
        cache.set(
            NS_PAGES,
            format!("{BASE}/proxy/api/imgur/chapter/xyz/"),
            r#"[{"src": "https://i.example/x.png", "description": ""}]"#.to_string(),
        );
        CubariPrototype::new(Fetcher::new("dibari-test", cache).unwrap(), BASE)
            .initialize(&SeriesIdentifier::from(("gist", "abc123")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_chapter_order_and_metadata() {
        let platform = platform().await;
        assert_eq!(platform.default_chapter().await.unwrap(), "1");
        assert_eq!(platform.next_chapter_key("1").await.unwrap().as_deref(), Some("1.5"));
        assert_eq!(platform.previous_chapter_key("2").await.unwrap().as_deref(), Some("1.5"));
        assert_eq!(platform.metadata().await.unwrap().title, "Gist Series");
        assert_eq!(platform.chapter_metadata("1-5").await.unwrap(), ChapterMetadata::new("1.5", "Interlude"));
    }

    #[tokio::test]
    async fn test_inline_and_proxied_pages() {
        let platform = platform().await;
        let inline = platform.pages("1").await.unwrap();
        assert_eq!(inline.urls, ["https://i.example/1.png", "https://i.example/2.png"]);
        assert_eq!(inline.group, "Scanlators");
        assert_eq!(platform.pages("1.5").await.unwrap().urls, ["https://i.example/a.png"]);
        assert_eq!(platform.pages("2").await.unwrap().urls, ["https://i.example/x.png"]);
        assert!(platform.pages("3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lowest_numeric_group_is_chosen() {
        let pages = platform().await.pages("4").await.unwrap();
        assert_eq!(pages.urls, ["https://i.example/early.png"]);
        assert_eq!(pages.group, "Early Birds");
    }

    #[tokio::test]
    async fn test_canonical_url() {
        let platform = platform().await;
        assert_eq!(platform.url(&Bookmark::new("1.5", 2)), "http://cubari.invalid/read/gist/abc123/1-5/3/");
    }
}
