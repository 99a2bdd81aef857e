use super::{from_sql_id, to_sql_id};
use crate::error::{Error, ErrorKind};
use dibari_filter::{ChannelScope, FilterType, RegexFilter};
use exn::ResultExt;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FilterRow {
    pub id: i64,
    pub guild_id: i64,
    pub filter_type: i64,
    pub channel_scope: i64,
    pub template: String,
    pub pattern: String,
    /// Comma-separated channel IDs from `GROUP_CONCAT`, `NULL` when there are
    /// none.
    pub channels: Option<String>,
}
impl TryFrom<&RegexFilter> for FilterRow {
    type Error = Error;
    fn try_from(filter: &RegexFilter) -> Result<Self, Self::Error> {
        Ok(Self {
            id: i64::from(filter.id),
            guild_id: to_sql_id(filter.guild_id, "guild id")?,
            filter_type: i64::from(filter.filter_type as u8),
            channel_scope: i64::from(filter.channel_scope as u8),
            template: filter.template.clone(),
            pattern: filter.pattern.clone(),
            channels: None,
        })
    }
}
impl TryFrom<FilterRow> for RegexFilter {
    type Error = Error;
    fn try_from(row: FilterRow) -> Result<Self, Self::Error> {
        let channels = row
            .channels
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|channel| !channel.is_empty())
            .map(|channel| channel.parse::<u64>().or_raise(|| ErrorKind::InvalidData("channel id")))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            id: u32::try_from(row.id).or_raise(|| ErrorKind::InvalidData("filter id"))?,
            guild_id: from_sql_id(row.guild_id, "guild id")?,
            filter_type: FilterType::try_from(row.filter_type).or_raise(|| ErrorKind::InvalidData("filter type"))?,
            channel_scope: ChannelScope::try_from(row.channel_scope)
                .or_raise(|| ErrorKind::InvalidData("channel scope"))?,
            channels,
            template: row.template,
            pattern: row.pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn row(channels: Option<&str>) -> FilterRow {
        FilterRow {
            id: 3,
            guild_id: 42,
            filter_type: 1,
            channel_scope: 0,
            template: "{{tags}}".to_string(),
            pattern: "romance".to_string(),
            channels: channels.map(str::to_string),
        }
    }

    #[test]
    fn test_row_to_model() {
        let filter = RegexFilter::try_from(row(Some("10,20"))).unwrap();
        assert_eq!(filter.id, 3);
        assert_eq!(filter.filter_type, FilterType::Allow);
        assert_eq!(filter.channel_scope, ChannelScope::Include);
        assert_eq!(filter.channels, BTreeSet::from([10, 20]));

        let filter = RegexFilter::try_from(row(None)).unwrap();
        assert!(filter.channels.is_empty());
    }

    #[test]
    fn test_corrupt_row_is_invalid_data() {
        let err = RegexFilter::try_from(FilterRow { filter_type: 7, ..row(None) }).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("filter type"));
        let err = RegexFilter::try_from(row(Some("10,x"))).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("channel id"));
    }

    #[test]
    fn test_model_to_row() {
        let filter = RegexFilter::new(u64::MAX, FilterType::Block, "t", "p");
        let err = FilterRow::try_from(&filter).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("guild id"));

        let row = FilterRow::try_from(&RegexFilter::new(42, FilterType::Allow, "t", "p")).unwrap();
        assert_eq!((row.id, row.filter_type, row.channel_scope), (0, 1, 1));
    }
}
