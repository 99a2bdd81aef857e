use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use dibari_filter::RegexFilter;
use dibari_store::Repository;

/// Per-guild configuration consulted on every read.
///
/// Implemented for the SQLite [`Repository`]; tests and other front ends can
/// supply their own.
#[async_trait]
pub trait GuildSettings: Send + Sync {
    /// Filters that apply in `channel_id`, in evaluation order.
    async fn filters(&self, guild_id: u64, channel_id: u64) -> Result<Vec<RegexFilter>>;

    /// URL of the series to open when none was given: the channel's default,
    /// otherwise the guild's.
    async fn default_series(&self, guild_id: u64, channel_id: u64) -> Result<Option<String>>;
}

#[async_trait]
impl GuildSettings for Repository {
    async fn filters(&self, guild_id: u64, channel_id: u64) -> Result<Vec<RegexFilter>> {
        self.list_filters_for_channel(guild_id, channel_id).await.map_err(ErrorKind::store)
    }

    async fn default_series(&self, guild_id: u64, channel_id: u64) -> Result<Option<String>> {
        let default = Repository::default_series(self, guild_id, channel_id).await.map_err(ErrorKind::store)?;
        Ok(default.map(|default| default.url))
    }
}
