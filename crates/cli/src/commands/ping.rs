// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Instant;

use mp_client::{Event, NotificationClient, ServerMessage};
use tokio::sync::mpsc;

use super::{connect, event_channel, open_client, wait_for};
use crate::config::Config;
use crate::error::Result;

/// Kind of the notification the server answers a test ping with.
const TEST_KIND: &str = "test";

pub async fn run(config: &Config) -> Result<()> {
    let client = open_client(config, false)?;
    let mut events = event_channel(&client);
    connect(&client).await?;

    let outcome = round_trip(&client, config, &mut events).await;
    client.disconnect();
    outcome
}

async fn round_trip(
    client: &NotificationClient,
    config: &Config,
    events: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let started = Instant::now();
    client.test_ping()?;

    let event = wait_for(events, config.connect_timeout(), "test notification", |e| {
        matches!(
            e.server_message(),
            Some(ServerMessage::Notification { kind, .. }) if kind == TEST_KIND
        )
    })
    .await?;

    if let Some(ServerMessage::Notification { summary, .. }) = event.server_message() {
        println!(
            "pong from {} in {}ms: {}",
            config.url,
            started.elapsed().as_millis(),
            summary
        );
    }
    Ok(())
}
