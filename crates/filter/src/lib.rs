//! Guild content filters.
//!
//! Guild operators restrict what may be read in their channels with an ordered
//! list of [`RegexFilter`]s. Each filter renders a template over the series'
//! metadata (see [`hydrate`]) and tests a regular expression against the
//! result; the [`FilterEngine`] decides whether a series is allowed in a
//! channel, failing closed when evaluation runs over its time budget.

mod engine;
pub mod error;
mod filter;
mod matcher;
mod template;

pub use crate::engine::{DEFAULT_BUDGET, FilterEngine};
pub use crate::filter::{ChannelScope, FilterChangeset, FilterType, RegexFilter};
pub use crate::matcher::{Matcher, RegexMatcher, within_deadline};
pub use crate::template::{FIELDS, hydrate, unknown_fields};
