use super::MangaDexSettings;
use super::schema::{Collection, Manga, relationship_names};
use crate::Fetcher;
use crate::error::Result;
use dibari_model::ContentRating;
use std::sync::Arc;
use tracing::instrument;

const NS_SEARCH: &str = "mangadex.search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub content_rating: ContentRating,
    pub url: String,
}

/// One page of MangaDex title search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub results: Vec<SearchResult>,
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
}
impl SearchResults {
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 { 0 } else { self.total.div_ceil(self.limit) }
    }
}

/// Title search against the MangaDex API, ordered by relevance.
#[derive(Clone)]
pub struct MangaDexSearch {
    fetcher: Fetcher,
    settings: Arc<MangaDexSettings>,
}
impl MangaDexSearch {
    pub fn new(fetcher: Fetcher, settings: MangaDexSettings) -> Self {
        Self { fetcher, settings: Arc::new(settings) }
    }

    pub fn limit(&self) -> u32 {
        self.settings.search_limit
    }

    /// Fetches the zero-based `page` of results for `query`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchResults> {
        let limit = self.settings.search_limit;
        let offset = page.saturating_mul(limit);
        let url = self.settings.api(&format!(
            "manga?title={}&limit={limit}&offset={offset}&order[relevance]=desc&includes[]=author",
            urlencoding::encode(query)
        ));
        let collection: Collection<Manga> = self.fetcher.get_json(NS_SEARCH, &url).await?;
        let language = &self.settings.language;
        let results = collection
            .data
            .into_iter()
            .map(|manga| {
                let metadata = manga.metadata(language);
                SearchResult {
                    url: self.settings.title_link(&manga.id),
                    author: relationship_names(&manga.relationships, "author"),
                    id: manga.id,
                    title: metadata.title,
                    description: metadata.description,
                    content_rating: metadata.content_rating,
                }
            })
            .collect();
        Ok(SearchResults { results, limit: collection.limit, offset: collection.offset, total: collection.total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_cache::CachePool;
    use rstest::rstest;

    #[rstest]
    #[case(0, 25, 0)]
    #[case(1, 25, 1)]
    #[case(25, 25, 1)]
    #[case(26, 25, 2)]
    #[case(10, 0, 0)]
    fn test_total_pages_rounds_up(#[case] total: u32, #[case] limit: u32, #[case] expected: u32) {
        let results = SearchResults { total, limit, ..Default::default() };
        assert_eq!(results.total_pages(), expected);
    }

    #[tokio::test]
    async fn test_search_parses_collection() {
        let settings = MangaDexSettings { api_url: "http://mangadex.invalid".to_string(), ..Default::default() };
        let cache = Arc::new(CachePool::default());
        cache.set(
            NS_SEARCH,
            "http://mangadex.invalid/manga?title=komi%20san&limit=25&offset=25&order[relevance]=desc&includes[]=author",
            r#"{"result": "ok", "limit": 25, "offset": 25, "total": 26, "data": [{
                "id": "abc", "attributes": {"title": {"en": "Komi"}, "description": {"en": "Shy."}},
                "relationships": [{"id": "p", "type": "author", "attributes": {"name": "Oda"}}]
            }]}"#
                .to_string(),
        );
        let search = MangaDexSearch::new(Fetcher::new("dibari-test", cache).unwrap(), settings);
        let results = search.search("komi san", 1).await.unwrap();
        assert_eq!(results.total_pages(), 2);
        assert_eq!(results.results.len(), 1);
        let result = &results.results[0];
        assert_eq!(result.title, "Komi");
        assert_eq!(result.author, "Oda");
        assert_eq!(result.description, "Shy.");
        assert_eq!(result.url, "https://mangadex.org/title/abc");
    }
}
