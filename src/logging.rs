//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so that standard output only ever carries the pages,
//! tokens and listings a command prints.
//!
//! # Log Levels
//!
//! - `warn` (default): filter timeouts (possible abuse) and upstream failures
//! - `info`: database and configuration setup
//! - `debug` (`-v`): navigation, filter decisions, cache writes
//! - `trace` (`-vv`): cache hits and misses, encoded tokens

use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CRATES: &[&str] = &[
    "dibari",
    "dibari_cache",
    "dibari_config",
    "dibari_filter",
    "dibari_model",
    "dibari_platform",
    "dibari_reader",
    "dibari_store",
    "dibari_token",
];

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human-readable.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::WARN, format: LogFormat::default(), with_ansi: io::stderr().is_terminal() }
    }
}
impl LogConfig {
    /// - `-q`: errors only
    /// - nothing: warnings
    /// - `-v`: debug
    /// - `-vv` and above: trace
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        };
        Self { level, ..Default::default() }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the level
/// chosen on the command line.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_env_filter(config.level));
    let layer = fmt::layer().with_writer(io::stderr).with_ansi(config.with_ansi).with_target(false);
    // A second initialization (only possible in tests) keeps the first.
    _ = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry().with(filter).with(layer.pretty()).try_init(),
        LogFormat::Compact => tracing_subscriber::registry().with(filter).with(layer.compact().without_time()).try_init(),
    };
}

/// Our crates at `level`; dependencies (sqlx, reqwest) stay at `warn`.
fn build_env_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    let directives = CRATES.iter().map(|name| format!("{name}={level}")).collect::<Vec<_>>().join(",");
    EnvFilter::new(format!("warn,{directives}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false, Level::WARN)]
    #[case(1, false, Level::DEBUG)]
    #[case(3, false, Level::TRACE)]
    #[case(2, true, Level::ERROR)]
    fn test_from_verbosity(#[case] verbose: u8, #[case] quiet: bool, #[case] expected: Level) {
        assert_eq!(LogConfig::from_verbosity(verbose, quiet).level, expected);
    }

    #[test]
    fn test_env_filter_covers_every_crate() {
        let filter = build_env_filter(Level::DEBUG).to_string();
        assert!(filter.contains("dibari_reader=debug"));
        assert!(filter.contains("dibari_platform=debug"));
    }
}
