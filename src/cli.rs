//! Command-line argument definitions.

use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dibari_filter::{ChannelScope, FilterType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dibari",
    version,
    about = "Read manga from MangaDex, xkcd and Cubari-supported sites",
    long_about = "Read manga from MangaDex, xkcd and Cubari-supported sites.\n\n\
                  Guild and channel IDs stand in for a chat server: content filters and default \
                  series are stored per guild and evaluated exactly as the chat front end would."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, short, value_name = "PATH", env = "DIBARI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v for debug, -vv for trace).
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormat,
}

/// Where a request comes from. Guild `0` is a direct message, where no
/// content filters apply.
#[derive(Args, Clone, Copy, Debug)]
pub struct Location {
    #[arg(long, default_value_t = 0)]
    pub guild: u64,
    #[arg(long, default_value_t = 0)]
    pub channel: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open a series by URL, or the channel's default series.
    Read(ReadArgs),
    /// Act on a state token, as if the button carrying it was pressed.
    Press {
        token: String,
        #[command(flatten)]
        location: Location,
    },
    /// Search MangaDex by title.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// One-based results page.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Print the state carried by a token.
    Decode { token: String },
    /// Manage a guild's content filters.
    #[command(subcommand)]
    Filter(FilterCommand),
    /// Manage default series.
    #[command(subcommand)]
    Default(DefaultCommand),
    /// List supported platform tags.
    Platforms,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Series URL. Falls back to the channel's, then the guild's default.
    pub url: Option<String>,
    /// Chapter key; the platform's default chapter when omitted.
    #[arg(long, default_value = "")]
    pub chapter: String,
    /// One-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[command(flatten)]
    pub location: Location,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterTypeArg {
    Block,
    Allow,
}
impl From<FilterTypeArg> for FilterType {
    fn from(arg: FilterTypeArg) -> Self {
        match arg {
            FilterTypeArg::Block => FilterType::Block,
            FilterTypeArg::Allow => FilterType::Allow,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChannelScopeArg {
    Include,
    Exclude,
}
impl From<ChannelScopeArg> for ChannelScope {
    fn from(arg: ChannelScopeArg) -> Self {
        match arg {
            ChannelScopeArg::Include => ChannelScope::Include,
            ChannelScopeArg::Exclude => ChannelScope::Exclude,
        }
    }
}

#[derive(Subcommand)]
pub enum FilterCommand {
    /// Add a filter. Filters are evaluated in the order they were added.
    Add {
        #[arg(long)]
        guild: u64,
        #[arg(long = "type", value_enum)]
        filter_type: FilterTypeArg,
        /// Text to test, with `{{field}}` placeholders, e.g. `{{tags}}`.
        #[arg(long)]
        template: String,
        /// Case-insensitive regular expression.
        #[arg(long)]
        pattern: String,
        #[arg(long, value_enum, default_value = "exclude")]
        scope: ChannelScopeArg,
        /// Channels the scope refers to. Repeat for several.
        #[arg(long = "channel")]
        channels: Vec<u64>,
    },
    /// Replace parts of an existing filter.
    Edit {
        id: u32,
        #[arg(long)]
        guild: u64,
        #[arg(long = "type", value_enum)]
        filter_type: Option<FilterTypeArg>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long, value_enum)]
        scope: Option<ChannelScopeArg>,
        /// Replaces the channel list. Repeat for several.
        #[arg(long = "channel")]
        channels: Option<Vec<u64>>,
        /// Clear the channel list.
        #[arg(long, conflicts_with = "channels")]
        no_channels: bool,
    },
    /// List filters, optionally only those applying in a channel.
    List {
        #[arg(long)]
        guild: u64,
        #[arg(long)]
        channel: Option<u64>,
    },
    Remove {
        id: u32,
        #[arg(long)]
        guild: u64,
    },
}

#[derive(Subcommand)]
pub enum DefaultCommand {
    /// Set the series opened when no URL is given. Without `--channel` it
    /// applies to the whole guild.
    Set {
        url: String,
        #[command(flatten)]
        location: Location,
    },
    /// Show the default series that applies in a channel.
    Get {
        #[command(flatten)]
        location: Location,
    },
    Remove {
        #[command(flatten)]
        location: Location,
    },
    List {
        #[arg(long)]
        guild: u64,
    },
}
