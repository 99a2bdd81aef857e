//! The reading flow, from a URL or a button press to a page to show.
//!
//! [`navigate`] moves a [`Bookmark`](dibari_model::Bookmark) across page and
//! chapter boundaries. The [`Reader`] wraps it with everything around a single
//! request: resolving the platform, checking the guild's content filters,
//! re-anchoring chapter aliases and working out which controls to disable.
//! [`Searcher`] does the same for MangaDex title search.

pub mod error;
mod guild;
mod navigation;
mod page;
mod proxy;
mod reader;
mod search;

pub use crate::guild::GuildSettings;
pub use crate::navigation::{Navigation, navigate};
pub use crate::page::{DisabledControls, ReaderPage, SearchPage};
pub use crate::proxy::{ImageProxy, ProxyEncoding};
pub use crate::reader::Reader;
pub use crate::search::Searcher;
