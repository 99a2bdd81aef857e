use crate::error::{ErrorKind, Result};
use crate::matcher::compile;
use crate::template::unknown_fields;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// What happens when a filter's pattern matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
    /// Deny content that matches.
    #[default]
    Block = 0,
    /// Deny content that does *not* match.
    Allow = 1,
}
impl TryFrom<i64> for FilterType {
    type Error = crate::error::Error;
    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Block),
            1 => Ok(Self::Allow),
            _ => exn::bail!(ErrorKind::UnknownDiscriminant { field: "filter type", value }),
        }
    }
}
impl Display for FilterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Block => "block",
            Self::Allow => "allow",
        })
    }
}

/// How a filter's channel entries select the channels it applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelScope {
    /// Applies only to the listed channels.
    Include = 0,
    /// Applies everywhere except the listed channels.
    #[default]
    Exclude = 1,
}
impl TryFrom<i64> for ChannelScope {
    type Error = crate::error::Error;
    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Include),
            1 => Ok(Self::Exclude),
            _ => exn::bail!(ErrorKind::UnknownDiscriminant { field: "channel scope", value }),
        }
    }
}
impl Display for ChannelScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        })
    }
}

/// A guild-owned content rule.
///
/// The default scope is [`ChannelScope::Exclude`] with no channels, so a new
/// filter applies to the whole guild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexFilter {
    /// Zero until the filter has been saved.
    pub id: u32,
    pub guild_id: u64,
    pub filter_type: FilterType,
    pub channel_scope: ChannelScope,
    pub channels: BTreeSet<u64>,
    pub template: String,
    pub pattern: String,
}
impl RegexFilter {
    pub fn new(guild_id: u64, filter_type: FilterType, template: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self { guild_id, filter_type, template: template.into(), pattern: pattern.into(), ..Default::default() }
    }

    pub fn with_scope(mut self, scope: ChannelScope, channels: impl IntoIterator<Item = u64>) -> Self {
        self.channel_scope = scope;
        self.channels = channels.into_iter().collect();
        self
    }

    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    pub fn applies_to(&self, channel_id: u64) -> bool {
        match self.channel_scope {
            ChannelScope::Include => self.channels.contains(&channel_id),
            ChannelScope::Exclude => !self.channels.contains(&channel_id),
        }
    }

    /// Whether a pattern result means the content must be denied.
    pub fn denies(&self, matched: bool) -> bool {
        match self.filter_type {
            FilterType::Block => matched,
            FilterType::Allow => !matched,
        }
    }

    /// Checks that the filter can be evaluated. Placeholders outside the
    /// template vocabulary are not an error (they render verbatim); see
    /// [`unknown_fields`] to warn about them.
    pub fn validate(&self) -> Result<()> {
        if self.template.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidFilter("template is empty".to_string()));
        }
        if self.pattern.is_empty() {
            exn::bail!(ErrorKind::InvalidFilter("pattern is empty".to_string()));
        }
        compile(&self.pattern)?;
        Ok(())
    }

    pub fn unknown_fields(&self) -> Vec<String> {
        unknown_fields(&self.template)
    }
}

/// Channel entries to add and remove when replacing a stored filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChangeset {
    pub added: BTreeSet<u64>,
    pub removed: BTreeSet<u64>,
}
impl FilterChangeset {
    pub fn between(old: &RegexFilter, new: &RegexFilter) -> Self {
        Self {
            added: new.channels.difference(&old.channels).copied().collect(),
            removed: old.channels.difference(&new.channels).copied().collect(),
        }
    }

    /// Changeset for a filter that doesn't exist yet.
    pub fn create(filter: &RegexFilter) -> Self {
        Self { added: filter.channels.clone(), removed: BTreeSet::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ChannelScope::Include, 10, true)]
    #[case(ChannelScope::Include, 20, false)]
    #[case(ChannelScope::Exclude, 10, false)]
    #[case(ChannelScope::Exclude, 20, true)]
    fn test_channel_scope(#[case] scope: ChannelScope, #[case] channel: u64, #[case] applies: bool) {
        let filter = RegexFilter::new(1, FilterType::Block, "{{title}}", "x").with_scope(scope, [10]);
        assert_eq!(filter.applies_to(channel), applies);
    }

    #[test]
    fn test_new_filter_applies_everywhere() {
        let filter = RegexFilter::new(1, FilterType::Block, "{{title}}", "x");
        assert!(!filter.is_saved());
        assert!(filter.applies_to(10));
        assert!(filter.applies_to(0));
    }

    #[rstest]
    #[case(FilterType::Block, true, true)]
    #[case(FilterType::Block, false, false)]
    #[case(FilterType::Allow, true, false)]
    #[case(FilterType::Allow, false, true)]
    fn test_denies(#[case] filter_type: FilterType, #[case] matched: bool, #[case] denied: bool) {
        assert_eq!(RegexFilter::new(1, filter_type, "t", "p").denies(matched), denied);
    }

    #[test]
    fn test_validate() {
        assert!(RegexFilter::new(1, FilterType::Block, "{{tags}}", "(?i)hentai").validate().is_ok());
        let err = RegexFilter::new(1, FilterType::Block, "{{tags}}", "(unclosed").validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPattern(_)));
        let err = RegexFilter::new(1, FilterType::Block, " ", "x").validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidFilter(_)));
    }

    #[test]
    fn test_changeset_between() {
        let old = RegexFilter::new(1, FilterType::Block, "t", "p").with_scope(ChannelScope::Include, [1, 2, 3]);
        let new = RegexFilter { pattern: "q".to_string(), ..old.clone() }.with_scope(ChannelScope::Include, [2, 3, 4]);
        let changeset = FilterChangeset::between(&old, &new);
        assert_eq!(changeset.added, BTreeSet::from([4]));
        assert_eq!(changeset.removed, BTreeSet::from([1]));
        assert!(FilterChangeset::between(&old, &old).is_empty());
        assert_eq!(FilterChangeset::create(&new).added, BTreeSet::from([2, 3, 4]));
    }

    #[rstest]
    #[case(0, Some(FilterType::Block))]
    #[case(1, Some(FilterType::Allow))]
    #[case(2, None)]
    #[case(-1, None)]
    fn test_filter_type_discriminant(#[case] value: i64, #[case] expected: Option<FilterType>) {
        assert_eq!(FilterType::try_from(value).ok(), expected);
    }
}
