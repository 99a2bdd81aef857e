use crate::error::{ErrorKind, Result};
use dibari_cache::CachePool;
use exn::ResultExt;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

/// HTTP client for upstream APIs with a read-through response cache.
///
/// Response bodies are cached as text, keyed by URL, in the namespace given
/// by the caller. Only bodies that parsed successfully are cached, so a
/// malformed response is refetched next time rather than served for an hour.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    cache: Arc<CachePool<String>>,
}
impl Fetcher {
    pub fn new(user_agent: &str, cache: Arc<CachePool<String>>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .or_raise(|| ErrorKind::Transport("could not build HTTP client".to_string()))?;
        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> &Arc<CachePool<String>> {
        &self.cache
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, namespace: &str, url: &str) -> Result<T> {
        if let Some(body) = self.cache.get(namespace, url) {
            return parse(url, &body);
        }
        debug!("fetching from upstream");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .or_raise(|| ErrorKind::Transport(format!("request to {url} failed")))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(url.to_string()));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Transport(format!("{url} responded with {status}")));
        }
        let body = response
            .text()
            .await
            .or_raise(|| ErrorKind::Transport(format!("could not read response from {url}")))?;
        let value = parse(url, &body)?;
        self.cache.set(namespace, url, body);
        Ok(value)
    }
}

fn parse<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).or_raise(|| ErrorKind::InvalidData(format!("unexpected response from {url}")))
}
