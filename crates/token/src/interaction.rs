use std::fmt::{Display, Formatter, Result as FmtResult};

/// Discriminator stored as the first field of every token.
///
/// The numbering is part of the wire format: tokens already attached to sent
/// messages must keep decoding, so values are never reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InteractionType {
    None = 0,
    Close = 1,
    MangaBackPage = 2,
    MangaForwardPage = 3,
    MangaBackChapter = 4,
    MangaForwardChapter = 5,
    MangaOpen = 6,
    SearchForManga = 7,
    SearchBackPage = 8,
    SearchForwardPage = 9,
    SearchSelectManga = 10,
    DebugSwitchPage = 11,
    DebugClearCache = 12,
}
impl InteractionType {
    const ALL: [Self; 13] = [
        Self::None,
        Self::Close,
        Self::MangaBackPage,
        Self::MangaForwardPage,
        Self::MangaBackChapter,
        Self::MangaForwardChapter,
        Self::MangaOpen,
        Self::SearchForManga,
        Self::SearchBackPage,
        Self::SearchForwardPage,
        Self::SearchSelectManga,
        Self::DebugSwitchPage,
        Self::DebugClearCache,
    ];

    pub fn from_discriminant(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub fn discriminant(&self) -> u8 {
        *self as u8
    }
}
impl Display for InteractionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_are_positional() {
        for (index, interaction) in InteractionType::ALL.iter().enumerate() {
            assert_eq!(usize::from(interaction.discriminant()), index);
            assert_eq!(InteractionType::from_discriminant(interaction.discriminant()), Some(*interaction));
        }
        assert_eq!(InteractionType::from_discriminant(13), None);
    }
}
