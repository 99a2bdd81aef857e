//! SQLite persistence for guild settings.
//!
//! Guild operators configure two things that outlive a single request:
//! - **Regex filters**: ordered content rules, each owning the set of channel
//!   IDs its scope refers to (deleted along with the filter).
//! - **Default series**: the series opened when the reader is started without
//!   a URL, either for one channel or guild-wide (channel `0`).
//!
//! Filter edits never mutate a stored filter in place. The caller builds the
//! replacement value and the [`Repository`] applies the difference as a
//! [`FilterChangeset`](dibari_filter::FilterChangeset).

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::DefaultSeries;
pub use crate::repo::Repository;
