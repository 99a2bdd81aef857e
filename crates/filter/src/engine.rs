use crate::error::{ErrorKind, Result};
use crate::filter::RegexFilter;
use crate::matcher::{Matcher, RegexMatcher};
use crate::template::hydrate;
use dibari_model::{SeriesIdentifier, SeriesMetadata};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Total wall-clock time one request may spend evaluating filters.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(1);

/// Decides whether a series may be read in a channel.
pub struct FilterEngine<M = RegexMatcher> {
    budget: Duration,
    matcher: M,
}
impl FilterEngine {
    pub fn new(budget: Duration) -> Self {
        Self::with_matcher(budget, RegexMatcher::new())
    }
}
impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}
impl<M: Matcher> FilterEngine<M> {
    pub fn with_matcher(budget: Duration, matcher: M) -> Self {
        Self { budget, matcher }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Evaluates the guild's `filters` in order against the series.
    ///
    /// Only filters belonging to `guild_id` that apply to `channel_id` are
    /// considered. The first Block filter that matches, or Allow filter that
    /// doesn't, denies the series and nothing after it is evaluated. With no
    /// denial the series is allowed.
    ///
    /// Fails closed with [`ErrorKind::FilterTimeout`] once the budget is
    /// spent, and with [`ErrorKind::InvalidPattern`] for a pattern that
    /// doesn't compile: in both cases the caller must not show the content.
    #[instrument(level = "debug", skip(self, metadata, filters), fields(series = %identifier))]
    pub fn is_allowed(
        &self,
        guild_id: u64,
        channel_id: u64,
        metadata: &SeriesMetadata,
        identifier: &SeriesIdentifier,
        filters: &[RegexFilter],
    ) -> Result<bool> {
        let started = Instant::now();
        let applicable = filters
            .iter()
            .filter(|filter| filter.guild_id == guild_id && filter.applies_to(channel_id));
        for filter in applicable {
            let remaining = self.budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                warn!(guild_id, channel_id, filter = filter.id, "filter budget exhausted, possible abuse");
                exn::bail!(ErrorKind::FilterTimeout);
            }
            let haystack = hydrate(&filter.template, metadata, identifier);
            let matched = self.matcher.is_match(&filter.pattern, &haystack, remaining).inspect_err(|err| {
                if matches!(&**err, ErrorKind::FilterTimeout) {
                    warn!(guild_id, channel_id, filter = filter.id, pattern = %filter.pattern, "filter timed out, possible abuse");
                }
            })?;
            if filter.denies(matched) {
                debug!(filter = filter.id, filter_type = %filter.filter_type, "denied");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
