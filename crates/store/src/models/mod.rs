mod default;
mod filter;

pub use self::default::DefaultSeries;
pub(crate) use self::default::DefaultSeriesRow;
pub(crate) use self::filter::FilterRow;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;

/// SQLite integers are signed; Discord snowflakes are not.
pub(crate) fn to_sql_id(id: u64, field: &'static str) -> Result<i64> {
    i64::try_from(id).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn from_sql_id(id: i64, field: &'static str) -> Result<u64> {
    u64::try_from(id).or_raise(|| ErrorKind::InvalidData(field))
}
