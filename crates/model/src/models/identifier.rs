use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifies one series on one platform.
///
/// Both halves are optional: the pair with neither set is the sentinel
/// returned when a URL could not be resolved. Empty strings are treated the
/// same as missing values, so `SeriesIdentifier::new("", "")` is the sentinel
/// too. This keeps the identifier lossless when it is flattened into a state
/// token, where an empty field is the only way to spell "nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SeriesIdentifier {
    platform: Option<String>,
    series: Option<String>,
}
impl SeriesIdentifier {
    pub fn new<P, S>(platform: P, series: S) -> Self
    where
        P: Into<Option<String>>,
        S: Into<Option<String>>,
    {
        Self {
            platform: platform.into().filter(|p| !p.is_empty()),
            series: series.into().filter(|s| !s.is_empty()),
        }
    }

    /// The "could not resolve" sentinel.
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    /// Returns `true` when neither the platform nor the series is known.
    pub fn is_unresolved(&self) -> bool {
        self.platform.is_none() && self.series.is_none()
    }
}
impl From<(&str, &str)> for SeriesIdentifier {
    fn from((platform, series): (&str, &str)) -> Self {
        Self::new(platform.to_string(), series.to_string())
    }
}
impl Display for SeriesIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.platform().unwrap_or_default(), self.series().unwrap_or_default())
    }
}
