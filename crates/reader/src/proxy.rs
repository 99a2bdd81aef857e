use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// How the original image URL is embedded in the proxy URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProxyEncoding {
    #[default]
    UrlEscaped,
    Base64,
}
impl ProxyEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlEscaped => "url_escaped",
            Self::Base64 => "base64",
        }
    }

    fn encode<'a>(&self, url: &'a str) -> Cow<'a, str> {
        match self {
            Self::UrlEscaped => urlencoding::encode(url),
            Self::Base64 => Cow::Owned(STANDARD.encode(url)),
        }
    }
}
impl Display for ProxyEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl FromStr for ProxyEncoding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url_escaped" | "urlescaped" => Ok(Self::UrlEscaped),
            "base64" => Ok(Self::Base64),
            other => Err(format!("unknown proxy encoding: {other}")),
        }
    }
}

/// Rewrites page image URLs through an image proxy, for platforms whose image
/// hosts refuse hotlinking from chat clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProxy {
    template: String,
    encoding: ProxyEncoding,
    platforms: BTreeSet<String>,
}
impl ImageProxy {
    /// Replaced by the encoded image URL.
    pub const PLACEHOLDER: &str = "{{URL}}";

    pub fn new<I, S>(template: impl Into<String>, encoding: ProxyEncoding, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let platforms = platforms.into_iter().map(|platform| platform.as_ref().to_ascii_lowercase()).collect();
        Self { template: template.into(), encoding, platforms }
    }

    pub fn applies_to(&self, platform: &str) -> bool {
        self.platforms.contains(&platform.to_ascii_lowercase())
    }

    /// The URL to show for an image from `platform`: proxied if the platform
    /// is configured for it, otherwise unchanged.
    pub fn rewrite<'a>(&self, url: &'a str, platform: &str) -> Cow<'a, str> {
        if !self.applies_to(platform) {
            return Cow::Borrowed(url);
        }
        Cow::Owned(self.template.replace(Self::PLACEHOLDER, &self.encoding.encode(url)))
    }
}
