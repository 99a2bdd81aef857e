use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use lru::LruCache;
use regex::{Regex, RegexBuilder};
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Compiled programs larger than this are rejected as invalid patterns.
const SIZE_LIMIT: usize = 1 << 20;
const COMPILED_CAPACITY: NonZeroUsize = NonZeroUsize::new(64).unwrap();

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(SIZE_LIMIT)
        .build()
        .or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))
}

/// Fails with [`ErrorKind::FilterTimeout`] if more than `deadline` has
/// elapsed since `started`.
pub fn within_deadline(started: Instant, deadline: Duration) -> Result<()> {
    if started.elapsed() > deadline {
        exn::bail!(ErrorKind::FilterTimeout);
    }
    Ok(())
}

/// Runs a filter pattern against a hydrated template.
pub trait Matcher: Send + Sync {
    /// Case-insensitive match of `pattern` against `haystack`. A match that
    /// takes longer than `deadline` fails with [`ErrorKind::FilterTimeout`].
    fn is_match(&self, pattern: &str, haystack: &str, deadline: Duration) -> Result<bool>;
}

/// [`Matcher`] backed by the `regex` crate.
///
/// Matching is linear in the haystack, so a pattern cannot backtrack
/// catastrophically; the deadline still bounds huge inputs and compilation.
/// Compiled patterns are kept in a small LRU since every request evaluates
/// the same handful of guild filters.
pub struct RegexMatcher {
    compiled: Mutex<LruCache<String, Regex>>,
}
impl RegexMatcher {
    pub fn new() -> Self {
        Self { compiled: Mutex::new(LruCache::new(COMPILED_CAPACITY)) }
    }

    fn regex(&self, pattern: &str) -> Result<Regex> {
        if let Some(regex) = self.compiled.lock().unwrap_or_else(PoisonError::into_inner).get(pattern) {
            return Ok(regex.clone());
        }
        let regex = compile(pattern)?;
        self.compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}
impl Default for RegexMatcher {
    fn default() -> Self {
        Self::new()
    }
}
impl Matcher for RegexMatcher {
    fn is_match(&self, pattern: &str, haystack: &str, deadline: Duration) -> Result<bool> {
        let started = Instant::now();
        let matched = self.regex(pattern)?.is_match(haystack);
        within_deadline(started, deadline)?;
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADLINE: Duration = Duration::from_secs(5);

    #[test]
    fn test_case_insensitive() {
        let matcher = RegexMatcher::new();
        assert!(matcher.is_match("^komi", "KOMI Can't Communicate", DEADLINE).unwrap());
        assert!(!matcher.is_match("^can't", "Komi Can't Communicate", DEADLINE).unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RegexMatcher::new().is_match("[", "anything", DEADLINE).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPattern(pattern) if pattern == "["));
    }

    #[test]
    fn test_oversized_pattern_is_invalid() {
        let err = RegexMatcher::new().is_match(r"(?:\w{1000}){1000}", "anything", DEADLINE).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPattern(_)));
    }

    #[test]
    fn test_zero_deadline_times_out() {
        let started = Instant::now() - Duration::from_millis(10);
        let err = within_deadline(started, Duration::ZERO).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilterTimeout));
        assert!(within_deadline(Instant::now(), DEADLINE).is_ok());
    }
}
