//! Plain-text rendering of reader and search pages, standing in for the chat
//! embeds and buttons.

use dibari_cache::NamespaceStats;
use dibari_filter::RegexFilter;
use dibari_model::Action;
use dibari_reader::{ReaderPage, SearchPage};
use dibari_store::DefaultSeries;
use dibari_token::{SearchAction, State, TokenCodec};
use std::fmt::Write;
use tracing::warn;

const MAX_TITLE_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 200;

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", text[..end].trim_end()),
        None => text.to_string(),
    }
}

/// A button: its token, or why it can't be pressed.
fn button(codec: &TokenCodec, label: &str, state: &State, disabled: bool) -> String {
    if disabled {
        return format!("  {label:<3} (disabled)");
    }
    match codec.encode(state) {
        Ok(token) => format!("  {label:<3} {token}"),
        Err(err) => {
            warn!(%label, error = %*err, "could not encode button state");
            format!("  {label:<3} (unavailable: {})", *err)
        },
    }
}

pub fn reader_page(page: &ReaderPage, codec: &TokenCodec) -> String {
    let mut out = String::new();
    _ = writeln!(out, "{}", page.chapter.display_title());
    _ = writeln!(out, "{}", page.url);
    _ = writeln!(out, "{}", page.position());
    _ = writeln!(out, "{}", page.page_url);
    let author = if page.metadata.author.is_empty() { "unknown" } else { &page.metadata.author };
    _ = writeln!(out, "{}, by {author}.", truncate(&page.metadata.title, MAX_TITLE_LENGTH));
    _ = writeln!(out, "Group: {}", page.group);
    if page.end_of_content {
        _ = writeln!(out, "(no further content in that direction)");
    }
    let controls = [
        ("<<", Action::BackChapter),
        ("<", Action::BackPage),
        (">", Action::ForwardPage),
        (">>", Action::ForwardChapter),
    ];
    for (label, action) in controls {
        let state = State::Navigate(page.state(action));
        _ = writeln!(out, "{}", button(codec, label, &state, page.disabled.is_disabled(action)));
    }
    out
}

pub fn search_page(page: &SearchPage, codec: &TokenCodec) -> String {
    let mut out = String::new();
    for (index, result) in page.results.iter().enumerate() {
        let author = if result.author.is_empty() { "unknown" } else { &result.author };
        let title = if result.title.is_empty() { "No title" } else { &result.title };
        _ = writeln!(out, "{}. {} by {}", index + 1, truncate(title, MAX_TITLE_LENGTH), truncate(author, MAX_TITLE_LENGTH));
        let description = if result.description.is_empty() { "No description." } else { &result.description };
        _ = writeln!(out, "   {} ({})", truncate(description, MAX_DESCRIPTION_LENGTH), result.url);
        let select = State::SelectManga { manga_id: result.id.clone() };
        _ = writeln!(out, "{}", button(codec, "open", &select, false));
    }
    _ = writeln!(out, "Page {}/{}", page.page.saturating_add(1), page.total_pages);
    let back = State::Search(page.state(SearchAction::BackPage));
    let forward = State::Search(page.state(SearchAction::ForwardPage));
    _ = writeln!(out, "{}", button(codec, "<", &back, page.back_disabled()));
    _ = writeln!(out, "{}", button(codec, ">", &forward, page.forward_disabled()));
    out
}

pub fn state(state: &State) -> String {
    match state {
        State::Navigate(navigate) => {
            format!("{}: {} at {} ({})", state.interaction_type(), navigate.identifier, navigate.bookmark, navigate.action)
        },
        State::Search(search) => {
            format!("{}: {:?}, page {}", state.interaction_type(), search.query, u64::from(search.page) + 1)
        },
        State::SelectManga { manga_id } => format!("{}: {manga_id}", state.interaction_type()),
        State::DebugSwitch(page) => format!("{}: {page:?}", state.interaction_type()),
    }
}

pub fn filter(filter: &RegexFilter) -> String {
    let channels = if filter.channels.is_empty() {
        "no channels".to_string()
    } else {
        filter.channels.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
    };
    format!(
        "#{} {} ({} {channels}): {:?} =~ /{}/",
        filter.id, filter.filter_type, filter.channel_scope, filter.template, filter.pattern
    )
}

pub fn default_series(default: &DefaultSeries) -> String {
    if default.is_guild_wide() {
        format!("guild-wide: {}", default.url)
    } else {
        format!("channel {}: {}", default.channel_id, default.url)
    }
}

pub fn cache_stats(stats: &[NamespaceStats]) -> String {
    if stats.is_empty() {
        return "cache is empty\n".to_string();
    }
    let width = stats.iter().map(|stat| stat.namespace.len()).max().unwrap_or_default();
    stats.iter().fold(String::new(), |mut out, stat| {
        _ = writeln!(out, "{:<width$}  {}", stat.namespace, stat.entries);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibari_filter::{ChannelScope, FilterType};
    use dibari_model::{Bookmark, ChapterMetadata, SeriesIdentifier, SeriesMetadata};
    use dibari_reader::DisabledControls;
    use rstest::rstest;

    #[rstest]
    #[case("short", 10, "short")]
    #[case("exactly ten", 11, "exactly ten")]
    #[case("a long title here", 6, "a long…")]
    #[case("ノーゲーム・ノーライフ", 4, "ノーゲー…")]
    fn test_truncate(#[case] input: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate(input, max), expected);
    }

    #[test]
    fn test_reader_page_buttons() {
        let page = ReaderPage {
            identifier: SeriesIdentifier::from(("xkcd", "xkcd")),
            bookmark: Bookmark::new("614", 0),
            chapter: ChapterMetadata::new("614", "Woodpecker"),
            metadata: SeriesMetadata { title: "xkcd".to_string(), author: "Randall Munroe".to_string(), ..Default::default() },
            page_url: "https://imgs.xkcd.com/comics/woodpecker.png".to_string(),
            page_count: 1,
            group: "xkcd".to_string(),
            url: "https://xkcd.com/614/".to_string(),
            disabled: DisabledControls::new(0, 0, true, false),
            end_of_content: false,
        };
        let text = reader_page(&page, &TokenCodec::default());
        assert!(text.contains("Chapter 614 | Page 1/1"));
        assert!(text.contains("xkcd, by Randall Munroe."));
        assert!(text.contains("<<  4|xkcd|xkcd|614|0"));
        assert!(text.contains(">>  (disabled)"));
    }

    #[test]
    fn test_filter_line() {
        let filter = RegexFilter { id: 7, ..RegexFilter::new(1, FilterType::Allow, "{{contentRating}}", "safe") }
            .with_scope(ChannelScope::Include, [10, 20]);
        assert_eq!(super::filter(&filter), "#7 allow (include 10,20): \"{{contentRating}}\" =~ /safe/");
    }

    #[test]
    fn test_cache_stats() {
        let stats = [
            NamespaceStats { namespace: "mangadex.manga".to_string(), entries: 2 },
            NamespaceStats { namespace: "xkcd".to_string(), entries: 10 },
        ];
        assert_eq!(cache_stats(&stats), "mangadex.manga  2\nxkcd            10\n");
    }
}
