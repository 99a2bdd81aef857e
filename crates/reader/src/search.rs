use crate::SearchPage;
use crate::error::{ErrorKind, Result};
use dibari_platform::MangaDexSearch;
use dibari_token::SearchState;
use tracing::{debug, instrument};

/// MangaDex title search, paged for the presentation layer.
#[derive(Clone)]
pub struct Searcher {
    search: MangaDexSearch,
}
impl Searcher {
    pub fn new(search: MangaDexSearch) -> Self {
        Self { search }
    }

    /// Fetches the zero-based `page` of results for `query`.
    ///
    /// Returns [`ErrorKind::NoResults`] when nothing matches.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        let results = self.search.search(query, page).await.map_err(ErrorKind::platform)?;
        let total_pages = results.total_pages();
        if total_pages == 0 {
            exn::bail!(ErrorKind::NoResults(query.to_string()));
        }
        debug!(total = results.total, total_pages, "search results");
        Ok(SearchPage { query: query.to_string(), page, total_pages, results: results.results })
    }

    /// Resumes a search from a button's state.
    pub async fn resume(&self, state: &SearchState) -> Result<SearchPage> {
        self.search(&state.query, state.page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_cache::CachePool;
    use dibari_platform::{Fetcher, MangaDexSettings};
    use dibari_token::SearchAction;
    use std::sync::Arc;

    const API: &str = "http://mangadex.invalid";

    fn url(query: &str, offset: u32) -> String {
        format!("{API}/manga?title={query}&limit=2&offset={offset}&order[relevance]=desc&includes[]=author")
    }

    fn manga(id: &str, title: &str) -> String {
        format!(r#"{{"id": "{id}", "attributes": {{"title": {{"en": "{title}"}}}}, "relationships": []}}"#)
    }

    fn searcher() -> Searcher {
        let cache = Arc::new(CachePool::default());
        cache.set(
            "mangadex.search",
            url("komi", 0),
            format!(r#"{{"limit": 2, "offset": 0, "total": 3, "data": [{}, {}]}}"#, manga("a", "Komi"), manga("b", "Komi 2")),
        );
        cache.set(
            "mangadex.search",
            url("komi", 2),
            format!(r#"{{"limit": 2, "offset": 2, "total": 3, "data": [{}]}}"#, manga("c", "Komi 3")),
        );
        cache.set("mangadex.search", url("nothing", 0), r#"{"limit": 2, "offset": 0, "total": 0, "data": []}"#.to_string());
        let settings = MangaDexSettings { api_url: API.to_string(), search_limit: 2, ..Default::default() };
        Searcher::new(MangaDexSearch::new(Fetcher::new("dibari-test", cache).unwrap(), settings))
    }

    #[tokio::test]
    async fn test_search_pages() {
        let searcher = searcher();
        let first = searcher.search("komi", 0).await.unwrap();
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.results.iter().map(|result| result.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert!(first.back_disabled());
        assert!(!first.forward_disabled());

        let second = searcher.resume(&first.state(SearchAction::ForwardPage)).await.unwrap();
        assert_eq!(second.page, 1);
        assert_eq!(second.results[0].title, "Komi 3");
        assert!(second.forward_disabled());
    }

    #[tokio::test]
    async fn test_no_results() {
        let err = searcher().search("nothing", 0).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NoResults("nothing".to_string()));
        assert!(err.is_user_error());
    }
}
