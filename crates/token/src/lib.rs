//! State tokens.
//!
//! Chat platforms give every button a short opaque ID and hand it back when
//! the button is pressed; the reader stores its whole state in that ID. A
//! token is a pipe-delimited list of positional fields whose first field is
//! the [`InteractionType`] discriminator, for example
//! `3|mangadex|a96676e5-8ae2-425e-b549-7f15dd34a6d8|12|4` to move forward a
//! page from page 5 of chapter 12.
//!
//! The [`TokenCodec`] refuses to produce a token longer than the platform
//! allows rather than truncate it, and refuses to decode a token whose field
//! count doesn't match its discriminator.

mod codec;
pub mod error;
mod interaction;
mod state;

pub use crate::codec::{DEFAULT_MAX_LENGTH, DELIMITER, TokenCodec, interaction_type};
pub use crate::interaction::InteractionType;
pub use crate::state::{DebugPage, NavigateState, SearchAction, SearchState, State};
