//! [xkcd](https://xkcd.com) adapter.
//!
//! The whole site is a single series. Every comic is a one-page chapter keyed
//! by its number, and the default chapter is the latest comic.

use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Platform, PlatformHandle, Prototype};
use async_trait::async_trait;
use dibari_model::{Bookmark, ChapterMetadata, ContentRating, Pages, SeriesIdentifier, SeriesMetadata};
use exn::OptionExt;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

const NS_LATEST: &str = "xkcd.latest";
const NS_COMIC: &str = "xkcd.comic";
/// There was never a comic 404.
const MISSING_COMIC: u32 = 404;

#[derive(Debug, Deserialize)]
struct Comic {
    num: u32,
    #[serde(default)]
    safe_title: String,
    img: String,
}

pub struct XkcdPrototype {
    fetcher: Fetcher,
    base_url: String,
}
impl XkcdPrototype {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        Self { fetcher, base_url: base_url.into().trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl Prototype for XkcdPrototype {
    #[instrument(skip(self), fields(series = %identifier))]
    async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle> {
        let latest: Comic = self.fetcher.get_json(NS_LATEST, &format!("{}/info.0.json", self.base_url)).await?;
        debug!(latest = latest.num, "initialized");
        Ok(Arc::new(Xkcd {
            identifier: identifier.clone(),
            fetcher: self.fetcher.clone(),
            base_url: self.base_url.clone(),
            latest: latest.num,
        }))
    }
}

struct Xkcd {
    identifier: SeriesIdentifier,
    fetcher: Fetcher,
    base_url: String,
    latest: u32,
}
impl Xkcd {
    /// Parses a chapter key into a comic number, accepting leading zeros.
    fn number(&self, key: &str) -> Option<u32> {
        key.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=self.latest).contains(n) && *n != MISSING_COMIC)
    }

    fn require(&self, key: &str) -> Result<u32> {
        self.number(key).ok_or_raise(|| ErrorKind::NotFound(format!("comic {key}")))
    }

    async fn comic(&self, number: u32) -> Result<Comic> {
        self.fetcher.get_json(NS_COMIC, &format!("{}/{number}/info.0.json", self.base_url)).await
    }
}

#[async_trait]
impl Platform for Xkcd {
    fn identifier(&self) -> &SeriesIdentifier {
        &self.identifier
    }

    async fn metadata(&self) -> Result<SeriesMetadata> {
        Ok(SeriesMetadata {
            title: "xkcd".to_string(),
            author: "Randall Munroe".to_string(),
            artist: "Randall Munroe".to_string(),
            description: "A webcomic of romance, sarcasm, math, and language.".to_string(),
            tags: ["Comedy", "Web Comic"].into_iter().map(String::from).collect(),
            content_rating: ContentRating::Safe,
        })
    }

    async fn default_chapter(&self) -> Result<String> {
        Ok(self.latest.to_string())
    }

    async fn has_chapter(&self, key: &str) -> Result<bool> {
        Ok(self.number(key).is_some())
    }

    async fn chapter_metadata(&self, key: &str) -> Result<ChapterMetadata> {
        let comic = self.comic(self.require(key)?).await?;
        Ok(ChapterMetadata::new(comic.num.to_string(), comic.safe_title))
    }

    async fn pages(&self, chapter: &str) -> Result<Pages> {
        let comic = self.comic(self.require(chapter)?).await?;
        Ok(Pages::new(vec![comic.img], "xkcd"))
    }

    async fn previous_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        let number = self.require(chapter)?;
        Ok((1..number).rev().find(|n| *n != MISSING_COMIC).map(|n| n.to_string()))
    }

    async fn next_chapter_key(&self, chapter: &str) -> Result<Option<String>> {
        let number = self.require(chapter)?;
        Ok((number + 1..=self.latest).find(|n| *n != MISSING_COMIC).map(|n| n.to_string()))
    }

    fn url(&self, bookmark: &Bookmark) -> String {
        match self.number(&bookmark.chapter) {
            Some(number) => format!("{}/{number}/", self.base_url),
            None => format!("{}/", self.base_url),
        }
    }
}
