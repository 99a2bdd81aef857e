//! dibari: a command-line front end for the manga reader.

use clap::Parser;
use dibari_config::Config;
use std::process::ExitCode;
use tracing::{debug, error};

mod app;
mod cli;
mod commands;
mod error;
mod logging;
mod render;

use crate::app::App;
use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::logging::{LogConfig, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet).with_format(cli.log_format));
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_user_error() {
                eprintln!("{}", *err);
                debug!("{err:?}");
            } else {
                error!("{err:?}");
                eprintln!("error: {}", *err);
                if err.is_retryable() {
                    eprintln!("(this may be temporary, try again)");
                }
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).map_err(ErrorKind::config)?;
    debug!(?config, "loaded configuration");
    let app = App::new(config)?;
    commands::run(&app, cli.command).await
}
