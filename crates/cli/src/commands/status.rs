// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use mp_client::{Event, EventKind, NotificationClient, ServerMessage};
use tokio::sync::mpsc;

use super::{connect, event_channel, open_client, wait_for};
use crate::config::Config;
use crate::error::Result;

/// Connect once, ask the server to describe the connection and print it.
pub async fn run(config: &Config) -> Result<()> {
    let client = open_client(config, false)?;
    let mut events = event_channel(&client);
    connect(&client).await?;

    let outcome = query(&client, config, &mut events).await;
    client.disconnect();
    outcome
}

/// Interest in the configured subject is declared first so the room list
/// reflects what `watch` would receive.
async fn query(
    client: &NotificationClient,
    config: &Config,
    events: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let credential = client.credentials().credential();
    if let Ok(descriptor) =
        config.descriptor(None, None, credential.as_ref().and_then(|c| c.subject()))
    {
        client.declare_interest(descriptor)?;
    }
    client.request_status()?;

    let event = wait_for(events, config.connect_timeout(), "status response", |e| {
        e.kind() == EventKind::StatusResponse
    })
    .await?;

    if let Some(ServerMessage::StatusResponse {
        client_id,
        peer_count,
        rooms,
        ..
    }) = event.server_message()
    {
        println!("url:       {}", config.url);
        println!("state:     {}", client.state());
        println!("client id: {}", client_id);
        println!("peers:     {}", peer_count);
        if rooms.is_empty() {
            println!("rooms:     none");
        } else {
            println!("rooms:     {}", rooms.join(", "));
        }
    }
    Ok(())
}
