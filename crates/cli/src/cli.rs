// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::colors;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for streamed events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One server message per line as received; lifecycle events go to stderr
    Json,
}

#[derive(Parser)]
#[command(name = "mailpulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Follow live email triage notifications from the command line")]
#[command(styles = colors::styles())]
pub struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log connection activity to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stream triage events as they happen
    #[command(after_help = colors::examples("\
Examples:
  mailpulse watch                        Follow the subject from config or token
  mailpulse watch -s user-7              Follow user-7
  mailpulse watch -a ops@example.com     Narrow to one mailbox
  mailpulse watch -n 1 -o json           Print the next event as JSON and exit"))]
    Watch(WatchArgs),

    /// Show this connection as the server sees it
    Status,

    /// Round-trip a test notification through the server
    Ping,

    /// Manage the stored access token
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// User whose triage stream to follow
    #[arg(short, long, value_parser = non_empty_string)]
    pub subject: Option<String>,

    /// Mailbox address to narrow the stream to
    #[arg(short, long, value_parser = non_empty_string)]
    pub address: Option<String>,

    /// Exit after this many triage events or notifications
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t)]
    pub output: OutputFormat,

    /// Exit instead of reconnecting when the connection drops
    #[arg(long)]
    pub no_reconnect: bool,
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Store the access token issued at login
    Set {
        #[arg(value_parser = non_empty_string)]
        token: String,
    },

    /// Show the stored token (redacted) and its claims
    Show,

    /// Remove the stored token
    Clear,
}
