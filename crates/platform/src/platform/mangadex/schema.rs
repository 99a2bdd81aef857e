//! Response shapes for the subset of the MangaDex API we read.

use dibari_model::{ContentRating, SeriesMetadata};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(super) struct Entity<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct Collection<T> {
    pub data: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
}

/// A string translated into any number of languages.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub(super) enum Localized {
    Map(BTreeMap<String, String>),
    // MangaDex serializes an empty map as `[]`.
    List(Vec<BTreeMap<String, String>>),
    #[default]
    Missing,
}
impl Localized {
    fn maps(&self) -> Vec<&BTreeMap<String, String>> {
        match self {
            Self::Map(map) => vec![map],
            Self::List(list) => list.iter().collect(),
            Self::Missing => Vec::new(),
        }
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.maps().into_iter().find_map(|map| map.get(language)).map(String::as_str)
    }

    /// The translation for `language`, or failing that, any translation.
    pub fn preferred(&self, language: &str) -> Option<&str> {
        self.get(language)
            .or_else(|| self.maps().into_iter().find_map(|map| map.values().next()).map(String::as_str))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Relationship {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RelationshipAttributes {
    #[serde(default)]
    pub name: Option<String>,
}

/// Names of every expanded relationship of `kind`, comma separated.
pub(super) fn relationship_names(relationships: &[Relationship], kind: &str) -> String {
    relationships
        .iter()
        .filter(|relationship| relationship.kind == kind)
        .filter_map(|relationship| relationship.attributes.as_ref()?.name.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize)]
pub(super) struct Manga {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MangaAttributes {
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub alt_titles: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub description: Localized,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Tag {
    pub attributes: TagAttributes,
}

#[derive(Debug, Deserialize)]
pub(super) struct TagAttributes {
    #[serde(default)]
    pub name: Localized,
}

impl Manga {
    pub fn title(&self, language: &str) -> String {
        let title = &self.attributes.title;
        title
            .get(language)
            .or_else(|| self.attributes.alt_titles.iter().find_map(|alt| alt.get(language)).map(String::as_str))
            .or_else(|| title.preferred(language))
            .unwrap_or_default()
            .to_string()
    }

    pub fn metadata(&self, language: &str) -> SeriesMetadata {
        let content_rating = match self.attributes.content_rating.as_deref() {
            Some(rating) => rating.parse().unwrap_or_else(|_| {
                warn!(manga = %self.id, rating, "unrecognised content rating");
                ContentRating::Unknown
            }),
            None => ContentRating::Unknown,
        };
        SeriesMetadata {
            title: self.title(language),
            author: relationship_names(&self.relationships, "author"),
            artist: relationship_names(&self.relationships, "artist"),
            description: self.attributes.description.preferred(language).unwrap_or_default().to_string(),
            tags: self
                .attributes
                .tags
                .iter()
                .filter_map(|tag| tag.attributes.name.preferred(language))
                .map(str::to_string)
                .collect(),
            content_rating,
        }
    }
}

/// Volumes and chapters are objects keyed by number, except when there are
/// none, in which case they're empty arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum Keyed<T> {
    Map(BTreeMap<String, T>),
    List(Vec<T>),
}
impl<T> Keyed<T> {
    pub fn into_values(self) -> Vec<T> {
        match self {
            Self::Map(map) => map.into_values().collect(),
            Self::List(list) => list,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Aggregate {
    pub volumes: Keyed<Volume>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Volume {
    pub chapters: Keyed<AggregateChapter>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AggregateChapter {
    pub chapter: String,
    pub id: String,
    #[serde(default)]
    pub others: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chapter {
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChapterAttributes {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AtHome {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Deserialize)]
pub(super) struct AtHomeChapter {
    pub hash: String,
    pub data: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANGA: &str = r#"{
        "result": "ok",
        "data": {
            "id": "a96676e5-8ae2-425e-b549-7f15dd34a6d8",
            "type": "manga",
            "attributes": {
                "title": {"ja-ro": "Komi-san wa Komyushou desu."},
                "altTitles": [{"ja": "古見さんは、コミュ症です。"}, {"en": "Komi Can't Communicate"}],
                "description": [],
                "contentRating": "safe",
                "tags": [
                    {"id": "1", "type": "tag", "attributes": {"name": {"en": "Comedy"}}},
                    {"id": "2", "type": "tag", "attributes": {"name": {"en": "Romance"}}}
                ]
            },
            "relationships": [
                {"id": "b1", "type": "author", "attributes": {"name": "Oda Tomohito"}},
                {"id": "b1", "type": "artist", "attributes": {"name": "Oda Tomohito"}},
                {"id": "c1", "type": "cover_art"}
            ]
        }
    }"#;

    #[test]
    fn test_manga_metadata() {
        let manga: Entity<Manga> = serde_json::from_str(MANGA).unwrap();
        let metadata = manga.data.metadata("en");
        // No English main title, so the English alternative title wins.
        assert_eq!(metadata.title, "Komi Can't Communicate");
        assert_eq!(manga.data.title("fr"), "Komi-san wa Komyushou desu.");
        assert_eq!(metadata.author, "Oda Tomohito");
        assert_eq!(metadata.artist, "Oda Tomohito");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.joined_tags(), "Comedy,Romance");
        assert_eq!(metadata.content_rating, ContentRating::Safe);
    }

    #[test]
    fn test_unknown_content_rating() {
        let json = r#"{"id": "x", "attributes": {"title": {"en": "X"}, "contentRating": "spicy"}}"#;
        let manga: Manga = serde_json::from_str(json).unwrap();
        assert_eq!(manga.metadata("en").content_rating, ContentRating::Unknown);
    }

    #[test]
    fn test_aggregate_accepts_empty_arrays() {
        let aggregate: Aggregate = serde_json::from_str(r#"{"result": "ok", "volumes": []}"#).unwrap();
        assert!(aggregate.volumes.into_values().is_empty());

        let json = r#"{"volumes": {"1": {"volume": "1", "chapters": {
            "1": {"chapter": "1", "id": "uuid-1", "others": ["uuid-1b"], "count": 2},
            "2": {"chapter": "2", "id": "uuid-2", "others": [], "count": 1}
        }}, "none": {"volume": "none", "chapters": []}}}"#;
        let aggregate: Aggregate = serde_json::from_str(json).unwrap();
        let chapters = aggregate
            .volumes
            .into_values()
            .into_iter()
            .flat_map(|volume| volume.chapters.into_values())
            .map(|chapter| chapter.chapter)
            .collect::<Vec<_>>();
        assert_eq!(chapters, ["1", "2"]);
    }
}
