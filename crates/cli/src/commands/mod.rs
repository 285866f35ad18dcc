// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.
//!
//! Network commands share one pattern: forward every client event into a
//! channel, connect, then drive the conversation from that channel.

pub mod ping;
pub mod status;
pub mod token;
pub mod watch;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mp_client::{Event, EventKind, NotificationClient};
use tokio::sync::mpsc;

use crate::cli::Command;
use crate::config::Config;
use crate::error::{Error, Result};

/// Execute a parsed command.
pub fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Token(cmd) => token::run(cmd, &config),
        Command::Watch(args) => block_on(watch::run(&config, args)),
        Command::Status => block_on(status::run(&config)),
        Command::Ping => block_on(ping::run(&config)),
    }
}

fn block_on<F: Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(fut)
}

/// Build a client from the config; `auto_reconnect` can only turn retries off.
pub(crate) fn open_client(config: &Config, auto_reconnect: bool) -> Result<NotificationClient> {
    let mut client_config = config.client_config();
    client_config.auto_reconnect &= auto_reconnect;
    let store = config.credential_store()?;
    Ok(NotificationClient::new(client_config, Arc::new(store)))
}

/// Forward every event the client emits into a channel.
pub(crate) fn event_channel(client: &NotificationClient) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    for kind in EventKind::ALL {
        let tx = tx.clone();
        client.on(kind, move |event| {
            let _ = tx.send(event.clone());
        });
    }
    rx
}

/// Connect, cancelling any retry the failed attempt scheduled.
pub(crate) async fn connect(client: &NotificationClient) -> Result<()> {
    if let Err(e) = client.connect().await {
        client.disconnect();
        return Err(e.into());
    }
    Ok(())
}

/// Wait up to `within` for the first event matching `pred`.
pub(crate) async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<Event>,
    within: Duration,
    what: &'static str,
    mut pred: impl FnMut(&Event) -> bool,
) -> Result<Event> {
    let found = tokio::time::timeout(within, async {
        while let Some(event) = events.recv().await {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    })
    .await;

    match found {
        Ok(Some(event)) => Ok(event),
        _ => Err(Error::NoResponse {
            what,
            waited: within,
        }),
    }
}
