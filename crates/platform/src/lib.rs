//! Platform adapters.
//!
//! Every supported manga source implements [`Platform`], which reduces it to
//! the same small navigation model: an ordered list of chapters, each with an
//! ordered list of page images. The [`Registry`] maps a platform tag (the
//! `platform` half of a [`SeriesIdentifier`](dibari_model::SeriesIdentifier))
//! to the [`Prototype`] that knows how to initialize an adapter for it.
//!
//! All upstream reads go through a [`Fetcher`], which consults the shared
//! [`CachePool`](dibari_cache::CachePool) before touching the network.

mod chapters;
pub mod error;
mod http;
pub mod platform;
mod registry;

pub use crate::http::Fetcher;
pub use crate::platform::mangadex::{MangaDexSearch, MangaDexSettings, SearchResult, SearchResults};
pub use crate::platform::{Platform, Prototype};
pub use crate::registry::{PlatformSettings, Registry};
use crate::platform::mangadex::{AT_HOME_TTL, NS_AT_HOME};
use dibari_cache::CachePool;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

pub type PlatformHandle = Arc<dyn Platform>;
pub type PrototypeHandle = Arc<dyn Prototype>;

/// A response cache for the built-in platforms: every namespace gets
/// `capacity` and `ttl`, except those whose upstream data goes stale sooner.
pub fn response_cache(capacity: NonZeroUsize, ttl: Duration) -> CachePool<String> {
    CachePool::new(capacity, ttl).with_namespace(NS_AT_HOME, capacity, ttl.min(AT_HOME_TTL))
}
