use dibari_model::{SeriesIdentifier, SeriesMetadata};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Placeholder names a filter template may use.
pub const FIELDS: &[&str] = &["title", "author", "artist", "seriesId", "platformId", "tags", "contentRating"];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

fn field(name: &str, metadata: &SeriesMetadata, identifier: &SeriesIdentifier) -> Option<String> {
    Some(match name {
        "title" => metadata.title.clone(),
        "author" => metadata.author.clone(),
        "artist" => metadata.artist.clone(),
        "seriesId" => identifier.series().unwrap_or_default().to_string(),
        "platformId" => identifier.platform().unwrap_or_default().to_string(),
        "tags" => metadata.joined_tags(),
        "contentRating" => metadata.content_rating.as_str().to_string(),
        _ => return None,
    })
}

/// Renders a filter template, replacing each `{{field}}` with the series'
/// value for it. Tags are comma-joined. Unknown placeholders are left as they
/// are.
///
/// ```
/// use dibari_filter::hydrate;
/// use dibari_model::{SeriesIdentifier, SeriesMetadata};
///
/// let metadata = SeriesMetadata { title: "Komi".to_string(), ..Default::default() };
/// let identifier = SeriesIdentifier::from(("mangadex", "abc"));
/// assert_eq!(hydrate("{{platformId}}: {{title}} {{nope}}", &metadata, &identifier), "mangadex: Komi {{nope}}");
/// ```
pub fn hydrate(template: &str, metadata: &SeriesMetadata, identifier: &SeriesIdentifier) -> String {
    PLACEHOLDER
        .replace_all(template, |captures: &Captures| {
            field(&captures[1], metadata, identifier).unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Placeholder names in `template` that [`hydrate`] won't replace.
pub fn unknown_fields(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|captures| captures[1].to_string())
        .filter(|name| !FIELDS.contains(&name.as_str()))
        .collect()
}
