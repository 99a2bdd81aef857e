//! Resolution of user-supplied URLs into [`SeriesIdentifier`]s.

use crate::SeriesIdentifier;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use regex::Regex;
use std::sync::LazyLock;
use tracing::instrument;

const URL_SEGMENT: &str = "([^/?#]+)";
const SAFE_END: &str = "(?:$|\\?|#|/)";
const SCHEME: &str = "^(?:https?://)?(?:www\\.)?";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(MANGADEX_REGEX, format!(r"{SCHEME}mangadex\.org/title/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(XKCD_REGEX, format!(r"{SCHEME}(?:m\.)?xkcd\.com(?:/\d+)?{SAFE_END}").as_str());
regex!(CUBARI_REGEX, format!(r"{SCHEME}cubari\.moe/read/{URL_SEGMENT}/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(IMGUR_REGEX, format!(r"{SCHEME}imgur\.com/(?:a|gallery)/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(IMGCHEST_REGEX, format!(r"{SCHEME}imgchest\.com/p/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(REDDIT_REGEX, format!(r"{SCHEME}reddit\.com/gallery/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(GIST_RAW_REGEX, format!(r"{SCHEME}gist\.githubusercontent\.com/([^?#]+?)/?(?:$|\?|#)").as_str());
regex!(GIST_REGEX, format!(r"{SCHEME}gist\.github\.com/{URL_SEGMENT}/{URL_SEGMENT}{SAFE_END}").as_str());
regex!(WEEBCENTRAL_REGEX, format!(r"{SCHEME}weebcentral\.com/series/{URL_SEGMENT}{SAFE_END}").as_str());

/// Single-capture patterns that map straight onto a platform tag.
static DIRECT: LazyLock<[(&'static LazyLock<Regex>, &'static str); 4]> = LazyLock::new(|| {
    [
        (&IMGUR_REGEX, "imgur"),
        (&IMGCHEST_REGEX, "imgchest"),
        (&REDDIT_REGEX, "reddit"),
        (&WEEBCENTRAL_REGEX, "weebcentral"),
    ]
});

/// Resolves a URL into the series it points at.
///
/// Returns [`SeriesIdentifier::unresolved`] (never an error) for anything
/// that isn't recognised; whether a recognised platform is actually supported
/// is for the adapter registry to decide.
#[instrument(level = "debug")]
pub fn resolve_series_from_url(url: &str) -> SeriesIdentifier {
    let url = url.trim().trim_start_matches('<').trim_end_matches('>');
    if let Some(captures) = MANGADEX_REGEX.captures(url) {
        return SeriesIdentifier::from(("mangadex", &captures[1]));
    }
    if XKCD_REGEX.is_match(url) {
        return SeriesIdentifier::from(("xkcd", "xkcd"));
    }
    if let Some(captures) = CUBARI_REGEX.captures(url) {
        return SeriesIdentifier::from((&captures[1], &captures[2]));
    }
    if let Some(path) = gist_path(url) {
        return SeriesIdentifier::new("gist".to_string(), URL_SAFE_NO_PAD.encode(format!("raw/{path}")));
    }
    for (regex, platform) in DIRECT.iter() {
        if let Some(captures) = regex.captures(url) {
            return SeriesIdentifier::from((*platform, &captures[1]));
        }
    }
    SeriesIdentifier::unresolved()
}

/// Cubari reads gists from their raw URL, given as the path after the host.
/// Gist page links point at the raw URL of the gist's latest revision.
fn gist_path(url: &str) -> Option<String> {
    if let Some(captures) = GIST_RAW_REGEX.captures(url) {
        return Some(captures[1].to_string());
    }
    GIST_REGEX.captures(url).map(|captures| format!("{}/{}/raw", &captures[1], &captures[2]))
}
