use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordered chapter keys plus the aliases that resolve to them.
///
/// Keys that parse as numbers are ordered numerically; anything else (one-shots,
/// "extra", an empty chapter number) sorts before them in the order it was
/// first seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChapterList {
    keys: Vec<String>,
    aliases: HashMap<String, String>,
}
impl ChapterList {
    pub(crate) fn new<K, A>(chapters: impl IntoIterator<Item = (K, A)>) -> Self
    where
        K: Into<String>,
        A: IntoIterator<Item = String>,
    {
        let mut list = Self::default();
        for (key, aliases) in chapters {
            let key = key.into();
            if !list.keys.contains(&key) {
                list.keys.push(key.clone());
            }
            for alias in aliases {
                if alias != key {
                    list.aliases.entry(alias).or_insert_with(|| key.clone());
                }
            }
        }
        // Stable, so equal keys (and all non-numeric keys) keep insertion order.
        list.keys.sort_by(|a, b| compare_keys(a, b));
        list
    }

    pub(crate) fn keys(&self) -> &[String] {
        &self.keys
    }

    pub(crate) fn first(&self) -> Option<&str> {
        self.keys.first().map(String::as_str)
    }

    /// Resolves a canonical key or alias to the canonical key.
    pub(crate) fn canonical(&self, key: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|k| *k == key)
            .or_else(|| self.aliases.get(key))
            .map(String::as_str)
    }

    fn position(&self, key: &str) -> Result<usize> {
        let canonical = self.canonical(key).ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))?;
        self.keys
            .iter()
            .position(|k| k == canonical)
            .ok_or_raise(|| ErrorKind::NotFound(format!("chapter {key}")))
    }

    pub(crate) fn previous(&self, key: &str) -> Result<Option<&str>> {
        let index = self.position(key)?;
        Ok(index.checked_sub(1).and_then(|i| self.keys.get(i)).map(String::as_str))
    }

    pub(crate) fn next(&self, key: &str) -> Result<Option<&str>> {
        let index = self.position(key)?;
        Ok(self.keys.get(index + 1).map(String::as_str))
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>().ok(), b.parse::<f64>().ok()) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(keys: &[&str]) -> ChapterList {
        ChapterList::new(keys.iter().map(|k| (*k, Vec::new())))
    }

    #[test]
    fn test_numeric_ordering() {
        let chapters = list(&["10", "2", "1.5", "1", "extra"]);
        assert_eq!(chapters.keys(), ["extra", "1", "1.5", "2", "10"]);
        assert_eq!(chapters.first(), Some("extra"));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let chapters = list(&["1", "2", "1"]);
        assert_eq!(chapters.keys(), ["1", "2"]);
    }

    #[test]
    fn test_neighbours() {
        let chapters = list(&["1", "2", "3"]);
        assert_eq!(chapters.previous("1").unwrap(), None);
        assert_eq!(chapters.previous("2").unwrap(), Some("1"));
        assert_eq!(chapters.next("2").unwrap(), Some("3"));
        assert_eq!(chapters.next("3").unwrap(), None);
        let err = chapters.next("4").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_aliases_resolve_to_canonical() {
        let chapters = ChapterList::new([
            ("1", vec!["uuid-one".to_string(), "uuid-one-b".to_string()]),
            ("2", vec!["uuid-two".to_string()]),
        ]);
        assert_eq!(chapters.canonical("uuid-one-b"), Some("1"));
        assert_eq!(chapters.canonical("2"), Some("2"));
        assert_eq!(chapters.canonical("uuid-three"), None);
        assert_eq!(chapters.next("uuid-one").unwrap(), Some("2"));
    }
}
