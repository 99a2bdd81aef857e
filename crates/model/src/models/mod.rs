mod action;
mod bookmark;
mod chapter;
mod identifier;
mod metadata;
mod rating;

pub use self::action::Action;
pub use self::bookmark::Bookmark;
pub use self::chapter::{ChapterMetadata, Pages};
pub use self::identifier::SeriesIdentifier;
pub use self::metadata::SeriesMetadata;
pub use self::rating::ContentRating;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}
