use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "DIBARI_";
const ENV_SEPARATOR: &str = "__";
const CONFIG_FILES: &[&str] = &["config.toml", "config.yaml", "config.yml", "config.json"];
/// MangaDex refuses larger pages.
const MAX_SEARCH_LIMIT: u32 = 100;
const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(50).unwrap();

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "dibari")
}

/// Where configuration files are looked for when none is given explicitly.
pub fn default_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// The platform's data directory, or the working directory if there isn't
/// one (no home directory, for example).
pub fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("dibari.sqlite"))
        .unwrap_or_else(|| PathBuf::from("dibari.sqlite"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Wall-clock budget for evaluating all of a channel's filters once.
    pub timeout_ms: u64,
}
impl FilterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
impl Default for FilterConfig {
    fn default() -> Self {
        Self { timeout_ms: 1000 }
    }
}

/// Applies to every cache namespace individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: NonZeroUsize,
    pub ttl_secs: u64,
}
impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CACHE_CAPACITY, ttl_secs: 60 * 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaDexConfig {
    pub api_url: String,
    /// `{{ID}}` is replaced with the manga UUID.
    pub title_url: String,
    /// `{{ID}}` is replaced with the chapter UUID, `{{PAGE}}` with the
    /// one-based page number.
    pub chapter_url: String,
    pub search_limit: u32,
    /// Translation language of the chapters to read.
    pub language: String,
}
impl Default for MangaDexConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mangadex.org".to_string(),
            title_url: "https://mangadex.org/title/{{ID}}".to_string(),
            chapter_url: "https://mangadex.org/chapter/{{ID}}/{{PAGE}}".to_string(),
            search_limit: 25,
            language: "en".to_string(),
        }
    }
}

/// Upstream locations of the platforms other than MangaDex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    pub xkcd_url: String,
    pub cubari_url: String,
}
impl Default for PlatformsConfig {
    fn default() -> Self {
        Self { xkcd_url: "https://xkcd.com".to_string(), cubari_url: "https://cubari.moe".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Longest state token the chat platform accepts.
    pub max_length: usize,
}
impl Default for TokenConfig {
    fn default() -> Self {
        Self { max_length: 100 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyEncoding {
    #[default]
    UrlEscaped,
    Base64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Image proxy URL, `{{URL}}` is replaced with the encoded image URL.
    pub url: Option<String>,
    pub encoding: ProxyEncoding,
    /// Platform tags whose images are proxied.
    pub platforms: Vec<String>,
}
impl ProxyConfig {
    /// The proxy URL, if any platform is configured to use it.
    pub fn enabled_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|_| !self.platforms.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding guild filters and default series.
    pub database: PathBuf,
    /// Sent with every upstream request.
    pub user_agent: String,
    pub filter: FilterConfig,
    pub cache: CacheConfig,
    pub mangadex: MangaDexConfig,
    pub platforms: PlatformsConfig,
    pub token: TokenConfig,
    pub proxy: ProxyConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            user_agent: concat!("dibari/", env!("CARGO_PKG_VERSION")).to_string(),
            filter: FilterConfig::default(),
            cache: CacheConfig::default(),
            mangadex: MangaDexConfig::default(),
            platforms: PlatformsConfig::default(),
            token: TokenConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from the first configuration
    /// file found in [`default_config_dir`] when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };
        Self::extract(file.as_deref())
    }

    fn discover() -> Option<PathBuf> {
        let dir = default_config_dir()?;
        CONFIG_FILES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
    }

    fn extract(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            debug!(path = %file.display(), "loading configuration file");
            figment = Self::merge_file(figment, file)?;
        }
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()
            .map_err(|err| exn::Exn::from(ErrorKind::Invalid(err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(figment: Figment, file: &Path) -> Result<Figment> {
        let extension = file.extension().and_then(|extension| extension.to_str()).unwrap_or_default();
        Ok(match extension.to_ascii_lowercase().as_str() {
            "toml" => figment.merge(Toml::file(file)),
            "yaml" | "yml" => figment.merge(Yaml::file(file)),
            "json" => figment.merge(Json::file(file)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
        })
    }

    fn validate(&self) -> Result<()> {
        let invalid = |key, reason| exn::Exn::from(ErrorKind::Validation { key, reason });
        if self.filter.timeout_ms == 0 {
            return Err(invalid("filter.timeout_ms", "must be greater than zero"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs", "must be greater than zero"));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.mangadex.search_limit) {
            return Err(invalid("mangadex.search_limit", "must be between 1 and 100"));
        }
        if self.token.max_length == 0 {
            return Err(invalid("token.max_length", "must be greater than zero"));
        }
        match &self.proxy.url {
            Some(url) if !url.contains("{{URL}}") => Err(invalid("proxy.url", "must contain {{URL}}")),
            None if !self.proxy.platforms.is_empty() => {
                Err(invalid("proxy.url", "required when proxy.platforms is set"))
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.timeout(), Duration::from_secs(1));
        assert_eq!(config.cache.capacity.get(), 50);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.mangadex.search_limit, 25);
        assert_eq!(config.token.max_length, 100);
        assert_eq!(config.proxy.enabled_url(), None);
    }

    #[test]
    fn test_file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                database = "guilds.sqlite"

                [cache]
                capacity = 10

                [proxy]
                url = "https://proxy.invalid/{{URL}}"
                encoding = "base64"
                platforms = ["imgur"]
                "#,
            )?;
            jail.set_env("DIBARI_CACHE__CAPACITY", 20);
            jail.set_env("DIBARI_FILTER__TIMEOUT_MS", 250);

            let config = Config::load(Some(Path::new("config.toml"))).map_err(|err| (*err).to_string())?;
            assert_eq!(config.database, PathBuf::from("guilds.sqlite"));
            // The environment wins over the file.
            assert_eq!(config.cache.capacity.get(), 20);
            assert_eq!(config.filter.timeout_ms, 250);
            assert_eq!(config.proxy.encoding, ProxyEncoding::Base64);
            assert_eq!(config.proxy.enabled_url(), Some("https://proxy.invalid/{{URL}}"));
            // Untouched keys keep their defaults.
            assert_eq!(config.mangadex, MangaDexConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "mangadex:\n  search_limit: 10\ntoken:\n  max_length: 80\n")?;
            let config = Config::load(Some(Path::new("config.yaml"))).map_err(|err| (*err).to_string())?;
            assert_eq!(config.mangadex.search_limit, 10);
            assert_eq!(config.token.max_length, 80);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::FileNotFound(path));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "database = x").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat(path));
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[cache]\ncapacity = 0\n")?;
            let err = Config::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case::zero_timeout("[filter]\ntimeout_ms = 0", "filter.timeout_ms")]
    #[case::zero_ttl("[cache]\nttl_secs = 0", "cache.ttl_secs")]
    #[case::search_limit_too_large("[mangadex]\nsearch_limit = 101", "mangadex.search_limit")]
    #[case::zero_token_length("[token]\nmax_length = 0", "token.max_length")]
    #[case::proxy_without_placeholder("[proxy]\nurl = \"https://proxy.invalid/\"", "proxy.url")]
    #[case::proxy_platforms_without_url("[proxy]\nplatforms = [\"imgur\"]", "proxy.url")]
    fn test_validation(#[case] contents: &str, #[case] expected_key: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", contents)?;
            let err = Config::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Validation { key, .. } if *key == expected_key));
            Ok(())
        });
    }
}
