use crate::error::{ErrorKind, Result};
use crate::platform::cubari::{self, CubariPrototype};
use crate::platform::mangadex::{MangaDexPrototype, MangaDexSettings};
use crate::platform::xkcd::XkcdPrototype;
use crate::{Fetcher, PlatformHandle, Prototype, PrototypeHandle};
use dibari_config::{MangaDexConfig, PlatformsConfig};
use dibari_model::SeriesIdentifier;
use exn::OptionExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Upstream locations for the built-in platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    pub mangadex: MangaDexSettings,
    pub xkcd_url: String,
    pub cubari_url: String,
}
impl PlatformSettings {
    pub fn new(mangadex: &MangaDexConfig, platforms: &PlatformsConfig) -> Self {
        Self {
            mangadex: MangaDexSettings::from(mangadex),
            xkcd_url: platforms.xkcd_url.clone(),
            cubari_url: platforms.cubari_url.clone(),
        }
    }
}
impl Default for PlatformSettings {
    fn default() -> Self {
        Self::new(&MangaDexConfig::default(), &PlatformsConfig::default())
    }
}

type Constructor = fn(&Fetcher, &PlatformSettings) -> PrototypeHandle;

fn mangadex_prototype(fetcher: &Fetcher, settings: &PlatformSettings) -> PrototypeHandle {
    Arc::new(MangaDexPrototype::new(fetcher.clone(), settings.mangadex.clone()))
}

fn xkcd_prototype(fetcher: &Fetcher, settings: &PlatformSettings) -> PrototypeHandle {
    Arc::new(XkcdPrototype::new(fetcher.clone(), settings.xkcd_url.as_str()))
}

fn cubari_prototype(fetcher: &Fetcher, settings: &PlatformSettings) -> PrototypeHandle {
    Arc::new(CubariPrototype::new(fetcher.clone(), settings.cubari_url.as_str()))
}

/// Built-in platforms. Supporting a new platform means adding a row here.
const BUILTIN: &[(&[&str], Constructor)] = &[
    (&["mangadex"], mangadex_prototype),
    (&["xkcd"], xkcd_prototype),
    (cubari::PLATFORMS, cubari_prototype),
];

/// Maps platform tags to the [`Prototype`] serving them.
///
/// An unknown tag is an expected outcome (the user pasted a link to a site we
/// don't support) and is reported as [`ErrorKind::UnsupportedPlatform`] rather
/// than as a fault.
#[derive(Clone, Default)]
pub struct Registry {
    prototypes: BTreeMap<String, PrototypeHandle>,
}
impl Registry {
    /// A registry with no platforms, for tests.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin(fetcher: &Fetcher, settings: &PlatformSettings) -> Self {
        let mut registry = Self::empty();
        for (tags, constructor) in BUILTIN {
            // Tags sharing a row share a prototype.
            let prototype = constructor(fetcher, settings);
            for tag in *tags {
                registry.prototypes.insert((*tag).to_string(), Arc::clone(&prototype));
            }
        }
        registry
    }

    /// Registers (or replaces) the prototype for `tag`.
    pub fn with(mut self, tag: impl Into<String>, prototype: impl Prototype + 'static) -> Self {
        self.prototypes.insert(tag.into(), Arc::new(prototype));
        self
    }

    pub fn resolve(&self, tag: &str) -> Option<&PrototypeHandle> {
        self.prototypes.get(tag)
    }

    pub fn supports(&self, tag: &str) -> bool {
        self.prototypes.contains_key(tag)
    }

    /// Registered platform tags, sorted.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    /// Resolves the identifier's platform and initializes an adapter for it.
    #[instrument(skip(self), fields(series = %identifier))]
    pub async fn initialize(&self, identifier: &SeriesIdentifier) -> Result<PlatformHandle> {
        let tag = identifier.platform().unwrap_or_default();
        let prototype = self.resolve(tag).ok_or_raise(|| ErrorKind::UnsupportedPlatform(tag.to_string()))?;
        prototype.initialize(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_cache::CachePool;
    use rstest::rstest;

    fn registry() -> Registry {
        let fetcher = Fetcher::new("dibari-test", Arc::new(CachePool::default())).unwrap();
        Registry::builtin(&fetcher, &PlatformSettings::default())
    }

    #[rstest]
    #[case("mangadex", true)]
    #[case("xkcd", true)]
    #[case("imgur", true)]
    #[case("gist", true)]
    #[case("reddit", true)]
    #[case("imgchest", true)]
    #[case("weebcentral", true)]
    #[case("pixiv", false)]
    #[case("", false)]
    #[tokio::test]
    async fn test_builtin_table(#[case] tag: &str, #[case] supported: bool) {
        assert_eq!(registry().resolve(tag).is_some(), supported);
    }

    #[tokio::test]
    async fn test_cubari_tags_share_prototype() {
        let registry = registry();
        let imgur = registry.resolve("imgur").unwrap();
        let gist = registry.resolve("gist").unwrap();
        assert!(Arc::ptr_eq(imgur, gist));
    }

    #[test]
    fn test_settings_follow_configuration() {
        let defaults = PlatformSettings::default();
        assert_eq!(defaults.xkcd_url, PlatformsConfig::default().xkcd_url);
        assert_eq!(defaults.mangadex.api_url, MangaDexConfig::default().api_url);

        let mangadex = MangaDexConfig { api_url: "http://mirror.invalid".to_string(), search_limit: 5, ..Default::default() };
        let platforms = PlatformsConfig { cubari_url: "http://cubari.invalid".to_string(), ..Default::default() };
        let settings = PlatformSettings::new(&mangadex, &platforms);
        assert_eq!(settings.mangadex.api_url, "http://mirror.invalid");
        assert_eq!(settings.mangadex.search_limit, 5);
        assert_eq!(settings.cubari_url, "http://cubari.invalid");
        assert_eq!(settings.xkcd_url, defaults.xkcd_url);
    }

    #[tokio::test]
    async fn test_unsupported_platform_is_distinct() {
        let err = registry().initialize(&SeriesIdentifier::from(("pixiv", "123"))).await.err().unwrap();
        assert!(matches!(&*err, ErrorKind::UnsupportedPlatform(tag) if tag == "pixiv"));

        let err = Registry::empty().initialize(&SeriesIdentifier::unresolved()).await.err().unwrap();
        assert!(matches!(&*err, ErrorKind::UnsupportedPlatform(_)));
    }
}
