use super::{from_sql_id, to_sql_id};
use crate::error::Error;

/// The series opened when the reader is started without a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSeries {
    pub guild_id: u64,
    /// `0` for the guild-wide default.
    pub channel_id: u64,
    pub url: String,
}
impl DefaultSeries {
    pub fn is_guild_wide(&self) -> bool {
        self.channel_id == 0
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DefaultSeriesRow {
    pub guild_id: i64,
    pub channel_id: i64,
    pub url: String,
}
impl TryFrom<&DefaultSeries> for DefaultSeriesRow {
    type Error = Error;
    fn try_from(default: &DefaultSeries) -> Result<Self, Self::Error> {
        Ok(Self {
            guild_id: to_sql_id(default.guild_id, "guild id")?,
            channel_id: to_sql_id(default.channel_id, "channel id")?,
            url: default.url.clone(),
        })
    }
}
impl TryFrom<DefaultSeriesRow> for DefaultSeries {
    type Error = Error;
    fn try_from(row: DefaultSeriesRow) -> Result<Self, Self::Error> {
        Ok(Self {
            guild_id: from_sql_id(row.guild_id, "guild id")?,
            channel_id: from_sql_id(row.channel_id, "channel id")?,
            url: row.url,
        })
    }
}
