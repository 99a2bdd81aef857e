//! Wiring: builds the library components from the loaded configuration.

use crate::error::{ErrorKind, Result};
use dibari_cache::CachePool;
use dibari_config::{Config, ProxyEncoding as ConfigProxyEncoding};
use dibari_filter::FilterEngine;
use dibari_platform::{Fetcher, MangaDexSearch, MangaDexSettings, PlatformSettings, Registry, response_cache};
use dibari_reader::{ImageProxy, ProxyEncoding, Reader, Searcher};
use dibari_store::Database;
use dibari_token::TokenCodec;
use exn::ResultExt;
use std::sync::Arc;
use tracing::{debug, info};

pub struct App {
    config: Config,
    cache: Arc<CachePool<String>>,
    fetcher: Fetcher,
    codec: TokenCodec,
}
impl App {
    pub fn new(config: Config) -> Result<Self> {
        let cache = Arc::new(response_cache(config.cache.capacity, config.cache.ttl()));
        let fetcher = Fetcher::new(&config.user_agent, Arc::clone(&cache)).map_err(ErrorKind::platform)?;
        let codec = TokenCodec::new(config.token.max_length);
        Ok(Self { config, cache, fetcher, codec })
    }

    pub fn cache(&self) -> &CachePool<String> {
        &self.cache
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn registry(&self) -> Registry {
        let settings = PlatformSettings::new(&self.config.mangadex, &self.config.platforms);
        Registry::builtin(&self.fetcher, &settings)
    }

    pub fn searcher(&self) -> Searcher {
        Searcher::new(MangaDexSearch::new(self.fetcher.clone(), MangaDexSettings::from(&self.config.mangadex)))
    }

    fn proxy(&self) -> Option<ImageProxy> {
        let proxy = &self.config.proxy;
        let url = proxy.enabled_url()?;
        let encoding = match proxy.encoding {
            ConfigProxyEncoding::UrlEscaped => ProxyEncoding::UrlEscaped,
            ConfigProxyEncoding::Base64 => ProxyEncoding::Base64,
        };
        Some(ImageProxy::new(url, encoding, &proxy.platforms))
    }

    /// Opens the guild settings database, creating it if necessary.
    pub async fn database(&self) -> Result<Database> {
        let path = &self.config.database;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).or_raise(|| ErrorKind::DataDirectory)?;
        }
        let db = Database::connect(path).await.map_err(ErrorKind::store)?;
        info!(path = %path.display(), "opened database");
        Ok(db)
    }

    pub fn reader(&self, db: &Database) -> Reader {
        let reader = Reader::new(self.registry(), Arc::new(db.repository()))
            .with_engine(FilterEngine::new(self.config.filter.timeout()));
        match self.proxy() {
            Some(proxy) => {
                debug!(platforms = ?self.config.proxy.platforms, "proxying images");
                reader.with_proxy(proxy)
            },
            None => reader,
        }
    }
}
