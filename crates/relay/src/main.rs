// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mp-relay: local notification relay for mailpulse clients.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mp_relay::{demo, server, RelayState};

/// mp-relay: Local notification relay for mailpulse
#[derive(Parser, Debug)]
#[command(name = "mp-relay")]
#[command(about = "Local WebSocket relay speaking the mailpulse notification protocol")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Accepted bearer token (repeatable; any non-empty token if omitted)
    #[arg(short, long = "token")]
    tokens: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Publish synthetic triage events to this user's room
    #[arg(long)]
    demo_subject: Option<String>,

    /// Seconds between synthetic triage events
    #[arg(long, default_value = "5")]
    demo_interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting mp-relay");
    info!("  Bind address: {}", args.bind);
    if args.tokens.is_empty() {
        info!("  Tokens: any non-empty token accepted");
    } else {
        info!("  Tokens: {} accepted", args.tokens.len());
    }

    let state = RelayState::new(args.tokens);

    if let Some(subject) = args.demo_subject {
        info!("  Demo traffic: user:{} every {}s", subject, args.demo_interval);
        let interval = Duration::from_secs(args.demo_interval.max(1));
        tokio::spawn(demo::run(state.clone(), subject, interval));
    }

    tokio::select! {
        result = server::run(args.bind, state.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            state.shutdown();
            Ok(())
        }
    }
}
