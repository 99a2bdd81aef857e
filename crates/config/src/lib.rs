//! Configuration for dibari.
//!
//! Values are layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: the path given on the command line, otherwise
//!    `config.toml`/`config.yaml`/`config.yml`/`config.json` in the platform's
//!    configuration directory (see [`default_config_dir`]) if one exists.
//! 3. Environment variables prefixed with `DIBARI_`, using `__` to reach
//!    nested keys: `DIBARI_FILTER__TIMEOUT_MS=500` sets `filter.timeout_ms`.
//!
//! ```toml
//! database = "/var/lib/dibari/dibari.sqlite"
//!
//! [proxy]
//! url = "https://proxy.example/?url={{URL}}"
//! encoding = "base64"
//! platforms = ["imgur"]
//! ```

mod config;
pub mod error;

pub use crate::config::{
    CacheConfig, Config, FilterConfig, MangaDexConfig, PlatformsConfig, ProxyConfig, ProxyEncoding, TokenConfig,
    default_config_dir, default_database_path,
};
