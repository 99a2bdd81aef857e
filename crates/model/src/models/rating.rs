use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Content rating, using the vocabulary MangaDex popularised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContentRating {
    Safe,
    Suggestive,
    Erotica,
    Pornographic,
    /// The platform does not rate its content.
    #[default]
    Unknown,
}
impl ContentRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::Safe => "Safe",
            ContentRating::Suggestive => "Suggestive",
            ContentRating::Erotica => "Erotica",
            ContentRating::Pornographic => "Pornographic",
            ContentRating::Unknown => "Unknown",
        }
    }
}
impl FromStr for ContentRating {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "safe" => Self::Safe,
            "suggestive" => Self::Suggestive,
            "erotica" => Self::Erotica,
            "pornographic" => Self::Pornographic,
            "unknown" | "" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "content rating",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for ContentRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
