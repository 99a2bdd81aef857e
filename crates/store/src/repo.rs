//! Guild settings: regex content filters and default series.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{DefaultSeries, DefaultSeriesRow, FilterRow, to_sql_id};
use dibari_filter::{FilterChangeset, RegexFilter};
use exn::{OptionExt, ResultExt};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

/// Repository for everything a guild operator can configure.
///
/// Filters and their channel entries are treated as a unit: a filter is always
/// returned with its full channel set, and saving a filter reconciles the
/// stored channel entries in the same transaction.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Every filter belonging to the guild, in creation order.
    pub async fn list_filters(&self, guild_id: u64) -> Result<Vec<RegexFilter>> {
        let rows: Vec<FilterRow> = sqlx::query_as(include_str!("../queries/list_filters.sql"))
            .bind(to_sql_id(guild_id, "guild id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(RegexFilter::try_from).collect()
    }

    /// Only the guild's filters whose channel scope covers `channel_id`.
    pub async fn list_filters_for_channel(&self, guild_id: u64, channel_id: u64) -> Result<Vec<RegexFilter>> {
        let rows: Vec<FilterRow> = sqlx::query_as(include_str!("../queries/list_filters_for_channel.sql"))
            .bind(to_sql_id(guild_id, "guild id")?)
            .bind(to_sql_id(channel_id, "channel id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(RegexFilter::try_from).collect()
    }

    /// A filter by ID. Filters from other guilds are reported as missing.
    pub async fn get_filter(&self, id: u32, guild_id: u64) -> Result<Option<RegexFilter>> {
        let row: Option<FilterRow> = sqlx::query_as(include_str!("../queries/get_filter.sql"))
            .bind(i64::from(id))
            .bind(to_sql_id(guild_id, "guild id")?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(RegexFilter::try_from).transpose()
    }

    /// Creates the filter when it has no ID yet, otherwise replaces the stored
    /// filter with the same ID. Returns the filter's ID.
    ///
    /// Returns [`ErrorKind::FilterNotFound`] when updating a filter that does
    /// not exist in the filter's guild.
    #[instrument(skip_all, fields(id = filter.id, guild_id = filter.guild_id))]
    pub async fn upsert_filter(&self, filter: &RegexFilter) -> Result<u32> {
        let row = FilterRow::try_from(filter)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let (id, changes) = if filter.is_saved() {
            let existing: FilterRow = sqlx::query_as(include_str!("../queries/get_filter.sql"))
                .bind(row.id)
                .bind(row.guild_id)
                .fetch_optional(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?
                .ok_or_raise(|| ErrorKind::FilterNotFound(filter.id))?;
            let existing = RegexFilter::try_from(existing)?;
            sqlx::query(include_str!("../queries/update_filter.sql"))
                .bind(row.id)
                .bind(row.guild_id)
                .bind(row.filter_type)
                .bind(row.channel_scope)
                .bind(&row.template)
                .bind(&row.pattern)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            (filter.id, FilterChangeset::between(&existing, filter))
        } else {
            let (id,): (i64,) = sqlx::query_as(include_str!("../queries/insert_filter.sql"))
                .bind(row.guild_id)
                .bind(row.filter_type)
                .bind(row.channel_scope)
                .bind(&row.template)
                .bind(&row.pattern)
                .fetch_one(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            let id = u32::try_from(id).or_raise(|| ErrorKind::InvalidData("filter id"))?;
            (id, FilterChangeset::create(filter))
        };
        Self::apply_channel_changes(&mut tx, id, &changes).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!(id, added = changes.added.len(), removed = changes.removed.len(), "saved filter");
        Ok(id)
    }

    async fn apply_channel_changes(tx: &mut Transaction<'_, Sqlite>, id: u32, changes: &FilterChangeset) -> Result<()> {
        for channel_id in &changes.added {
            sqlx::query(include_str!("../queries/add_channel_entry.sql"))
                .bind(i64::from(id))
                .bind(to_sql_id(*channel_id, "channel id")?)
                .execute(&mut **tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        for channel_id in &changes.removed {
            sqlx::query(include_str!("../queries/remove_channel_entry.sql"))
                .bind(i64::from(id))
                .bind(to_sql_id(*channel_id, "channel id")?)
                .execute(&mut **tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }

    /// Deletes a filter along with its channel entries. Returns `false` if the
    /// guild has no such filter.
    pub async fn delete_filter(&self, id: u32, guild_id: u64) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_filter.sql"))
            .bind(i64::from(id))
            .bind(to_sql_id(guild_id, "guild id")?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Default series
    // =========================================================================

    /// The default series for a channel, falling back to the guild-wide one.
    pub async fn default_series(&self, guild_id: u64, channel_id: u64) -> Result<Option<DefaultSeries>> {
        let row: Option<DefaultSeriesRow> = sqlx::query_as(include_str!("../queries/get_default_series.sql"))
            .bind(to_sql_id(guild_id, "guild id")?)
            .bind(to_sql_id(channel_id, "channel id")?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(DefaultSeries::try_from).transpose()
    }

    /// Sets (or replaces) a default series. A `channel_id` of `0` sets the
    /// guild-wide default.
    pub async fn set_default_series(&self, default: &DefaultSeries) -> Result<()> {
        let row = DefaultSeriesRow::try_from(default)?;
        sqlx::query(include_str!("../queries/set_default_series.sql"))
            .bind(row.guild_id)
            .bind(row.channel_id)
            .bind(row.url)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Returns `false` if there was nothing to remove.
    pub async fn remove_default_series(&self, guild_id: u64, channel_id: u64) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/remove_default_series.sql"))
            .bind(to_sql_id(guild_id, "guild id")?)
            .bind(to_sql_id(channel_id, "channel id")?)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Every default series configured in the guild, guild-wide first.
    pub async fn list_default_series(&self, guild_id: u64) -> Result<Vec<DefaultSeries>> {
        let rows: Vec<DefaultSeriesRow> = sqlx::query_as(include_str!("../queries/list_default_series.sql"))
            .bind(to_sql_id(guild_id, "guild id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(DefaultSeries::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_filter::{ChannelScope, FilterType};
    use rstest::rstest;
    use std::collections::BTreeSet;

    const GUILD: u64 = 1_000_000_000_000_000_001;
    const OTHER_GUILD: u64 = 2;

    async fn repo() -> Repository {
        Database::connect_in_memory().await.unwrap().repository()
    }

    fn filter(scope: ChannelScope, channels: impl IntoIterator<Item = u64>) -> RegexFilter {
        RegexFilter::new(GUILD, FilterType::Block, "{{tags}}", "gore").with_scope(scope, channels)
    }

    async fn channel_entry_count(repo: &Repository) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM regex_channel_entries").fetch_one(&repo.pool).await.unwrap();
        count
    }

    #[tokio::test]
    async fn test_insert_and_get_filter() {
        let repo = repo().await;
        let new = filter(ChannelScope::Include, [10, 20]);
        let id = repo.upsert_filter(&new).await.unwrap();
        assert!(id > 0);

        let stored = repo.get_filter(id, GUILD).await.unwrap().unwrap();
        assert_eq!(stored, RegexFilter { id, ..new });
        assert_eq!(repo.list_filters(GUILD).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_filters_are_guild_scoped() {
        let repo = repo().await;
        let id = repo.upsert_filter(&filter(ChannelScope::Exclude, [])).await.unwrap();

        assert_eq!(repo.get_filter(id, OTHER_GUILD).await.unwrap(), None);
        assert!(repo.list_filters(OTHER_GUILD).await.unwrap().is_empty());
        assert!(!repo.delete_filter(id, OTHER_GUILD).await.unwrap());

        let foreign = RegexFilter { id, guild_id: OTHER_GUILD, ..filter(ChannelScope::Exclude, []) };
        let err = repo.upsert_filter(&foreign).await.unwrap_err();
        assert_eq!(*err, ErrorKind::FilterNotFound(id));
    }

    #[tokio::test]
    async fn test_update_reconciles_channels() {
        let repo = repo().await;
        let id = repo.upsert_filter(&filter(ChannelScope::Include, [10, 20])).await.unwrap();

        let updated = RegexFilter {
            id,
            filter_type: FilterType::Allow,
            pattern: "romance".to_string(),
            ..filter(ChannelScope::Include, [20, 30])
        };
        assert_eq!(repo.upsert_filter(&updated).await.unwrap(), id);

        let stored = repo.get_filter(id, GUILD).await.unwrap().unwrap();
        assert_eq!(stored.filter_type, FilterType::Allow);
        assert_eq!(stored.pattern, "romance");
        assert_eq!(stored.channels, BTreeSet::from([20, 30]));
        assert_eq!(channel_entry_count(&repo).await, 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_channel_entries() {
        let repo = repo().await;
        let id = repo.upsert_filter(&filter(ChannelScope::Include, [10, 20, 30])).await.unwrap();
        assert_eq!(channel_entry_count(&repo).await, 3);

        assert!(repo.delete_filter(id, GUILD).await.unwrap());
        assert_eq!(channel_entry_count(&repo).await, 0);
        assert!(!repo.delete_filter(id, GUILD).await.unwrap());
    }

    #[rstest]
    #[case::included_channel(ChannelScope::Include, 10, true)]
    #[case::channel_not_included(ChannelScope::Include, 99, false)]
    #[case::excluded_channel(ChannelScope::Exclude, 10, false)]
    #[case::channel_not_excluded(ChannelScope::Exclude, 99, true)]
    #[tokio::test]
    async fn test_filters_for_channel(#[case] scope: ChannelScope, #[case] channel: u64, #[case] expected: bool) {
        let repo = repo().await;
        let new = filter(scope, [10, 20]);
        repo.upsert_filter(&new).await.unwrap();

        let filters = repo.list_filters_for_channel(GUILD, channel).await.unwrap();
        assert_eq!(!filters.is_empty(), expected);
        // The query must agree with the in-memory scope check.
        assert_eq!(new.applies_to(channel), expected);
        if expected {
            // Returned filters still carry every channel, not just the matching one.
            assert_eq!(filters[0].channels, BTreeSet::from([10, 20]));
        }
    }

    #[tokio::test]
    async fn test_exclude_with_no_channels_applies_everywhere() {
        let repo = repo().await;
        repo.upsert_filter(&filter(ChannelScope::Exclude, [])).await.unwrap();
        assert_eq!(repo.list_filters_for_channel(GUILD, 12345).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_default_series_channel_overrides_guild() {
        let repo = repo().await;
        assert_eq!(repo.default_series(GUILD, 10).await.unwrap(), None);

        let guild_wide = DefaultSeries { guild_id: GUILD, channel_id: 0, url: "https://xkcd.com/".to_string() };
        repo.set_default_series(&guild_wide).await.unwrap();
        assert_eq!(repo.default_series(GUILD, 10).await.unwrap().as_ref(), Some(&guild_wide));

        let channel = DefaultSeries { guild_id: GUILD, channel_id: 10, url: "https://mangadex.org/title/abc".to_string() };
        repo.set_default_series(&channel).await.unwrap();
        assert_eq!(repo.default_series(GUILD, 10).await.unwrap().as_ref(), Some(&channel));
        assert_eq!(repo.default_series(GUILD, 11).await.unwrap().as_ref(), Some(&guild_wide));
        assert_eq!(repo.list_default_series(GUILD).await.unwrap(), vec![guild_wide.clone(), channel]);

        assert!(repo.remove_default_series(GUILD, 10).await.unwrap());
        assert!(!repo.remove_default_series(GUILD, 10).await.unwrap());
        assert_eq!(repo.default_series(GUILD, 10).await.unwrap(), Some(guild_wide));
    }

    #[tokio::test]
    async fn test_set_default_series_replaces() {
        let repo = repo().await;
        let first = DefaultSeries { guild_id: GUILD, channel_id: 0, url: "https://xkcd.com/".to_string() };
        repo.set_default_series(&first).await.unwrap();
        let second = DefaultSeries { url: "https://cubari.moe/read/gist/abc/".to_string(), ..first };
        repo.set_default_series(&second).await.unwrap();
        assert_eq!(repo.list_default_series(GUILD).await.unwrap(), vec![second]);
    }
}
