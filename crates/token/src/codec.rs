use crate::error::{ErrorKind, Result};
use crate::{DebugPage, InteractionType, NavigateState, SearchAction, SearchState, State};
use dibari_model::{Action, Bookmark, SeriesIdentifier};
use exn::{OptionExt, ResultExt};
use tracing::trace;

pub const DELIMITER: char = '|';
/// Discord's limit on component custom IDs.
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// Peeks at a token's discriminator without decoding the rest of it.
pub fn interaction_type(token: &str) -> Result<InteractionType> {
    let discriminator = token.split(DELIMITER).next().unwrap_or_default();
    discriminator
        .parse::<u8>()
        .ok()
        .and_then(InteractionType::from_discriminant)
        .ok_or_raise(|| ErrorKind::MalformedToken(format!("unknown interaction type '{discriminator}'")))
}

fn fields<'a, const N: usize>(interaction: InteractionType, payload: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(payload).or_raise(|| {
        ErrorKind::MalformedToken(format!("{interaction} expects {N} fields, found {}", payload.len()))
    })
}

fn number(field: &'static str, value: &str) -> Result<u32> {
    // Reject the sign `u32::from_str` would otherwise tolerate, so that only
    // canonical tokens decode.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        exn::bail!(ErrorKind::MalformedToken(format!("{field} is not a number")));
    }
    value.parse::<u32>().or_raise(|| ErrorKind::MalformedToken(format!("{field} is out of range")))
}

/// Encodes and decodes [`State`] tokens no longer than a fixed number of
/// characters.
///
/// ```
/// use dibari_token::{SearchAction, SearchState, State, TokenCodec};
///
/// let codec = TokenCodec::default();
/// let state = State::Search(SearchState::new(SearchAction::ForwardPage, "komi", 2));
/// let token = codec.encode(&state).unwrap();
/// assert_eq!(token, "9|komi|2");
/// assert_eq!(codec.decode(&token).unwrap(), state);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCodec {
    max_length: usize,
}
impl TokenCodec {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn encode(&self, state: &State) -> Result<String> {
        let fields: Vec<(&'static str, String)> = match state {
            State::Navigate(navigate) => vec![
                ("platform", navigate.identifier.platform().unwrap_or_default().to_string()),
                ("series", navigate.identifier.series().unwrap_or_default().to_string()),
                ("chapter", navigate.bookmark.chapter.clone()),
                ("page", navigate.bookmark.page.to_string()),
            ],
            State::Search(search) => vec![("query", search.query.clone()), ("page", search.page.to_string())],
            State::SelectManga { manga_id } => vec![("manga id", manga_id.clone())],
            State::DebugSwitch(page) => vec![("debug page", (*page as u8).to_string())],
        };
        let mut token = state.interaction_type().discriminant().to_string();
        for (name, value) in fields {
            if value.contains(DELIMITER) {
                exn::bail!(ErrorKind::InvalidField(name));
            }
            token.push(DELIMITER);
            token.push_str(&value);
        }
        let length = token.chars().count();
        if length > self.max_length {
            exn::bail!(ErrorKind::TooLong { length, max: self.max_length });
        }
        trace!(%token, "encoded state");
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<State> {
        let interaction = interaction_type(token)?;
        let payload = token.split(DELIMITER).skip(1).collect::<Vec<_>>();
        use InteractionType as I;
        let state = match interaction {
            I::MangaBackPage | I::MangaForwardPage | I::MangaBackChapter | I::MangaForwardChapter | I::MangaOpen => {
                let [platform, series, chapter, page] = fields::<4>(interaction, &payload)?;
                let action = match interaction {
                    I::MangaBackPage => Action::BackPage,
                    I::MangaForwardPage => Action::ForwardPage,
                    I::MangaBackChapter => Action::BackChapter,
                    I::MangaForwardChapter => Action::ForwardChapter,
                    _ => Action::Open,
                };
                State::Navigate(NavigateState::new(
                    action,
                    SeriesIdentifier::new(platform.to_string(), series.to_string()),
                    Bookmark::new(chapter, number("page", page)?),
                ))
            },
            I::SearchForManga | I::SearchBackPage | I::SearchForwardPage => {
                let [query, page] = fields::<2>(interaction, &payload)?;
                let action = match interaction {
                    I::SearchBackPage => SearchAction::BackPage,
                    I::SearchForwardPage => SearchAction::ForwardPage,
                    _ => SearchAction::Search,
                };
                State::Search(SearchState::new(action, query, number("page", page)?))
            },
            I::SearchSelectManga => {
                let [manga_id] = fields::<1>(interaction, &payload)?;
                State::SelectManga { manga_id: manga_id.to_string() }
            },
            I::DebugSwitchPage => {
                let [page] = fields::<1>(interaction, &payload)?;
                let page = u8::try_from(number("debug page", page)?)
                    .ok()
                    .and_then(DebugPage::from_discriminant)
                    .ok_or_raise(|| ErrorKind::MalformedToken(format!("unknown debug page '{page}'")))?;
                State::DebugSwitch(page)
            },
            I::None | I::Close | I::DebugClearCache => {
                exn::bail!(ErrorKind::MalformedToken(format!("{interaction} carries no state")))
            },
        };
        Ok(state)
    }
}
impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}
