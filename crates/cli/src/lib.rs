// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mailpulse - follow live email triage notifications from a terminal.
//!
//! This crate backs the `mailpulse` binary. It loads `mailpulse.toml`,
//! builds an [`mp_client::NotificationClient`] from it and drives one of
//! the commands:
//!
//! - `watch` streams triage events for a subject until interrupted
//! - `status` and `ping` make a single round trip to the relay
//! - `token` manages the persisted access token

mod cli;
pub mod colors;
mod commands;
pub mod config;
mod display;
pub mod env;
pub mod error;

pub use cli::{Cli, Command, OutputFormat, TokenCommand, WatchArgs};
pub use config::Config;
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);
    let config = Config::discover(cli.config.as_deref())?;
    commands::run(cli.command, config)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
