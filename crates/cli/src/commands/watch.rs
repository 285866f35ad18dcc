// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use mp_client::{ClientError, Event, NotificationClient};
use tokio::sync::mpsc;
use tracing::info;

use super::{connect, event_channel, open_client};
use crate::cli::{OutputFormat, WatchArgs};
use crate::colors;
use crate::config::Config;
use crate::display;
use crate::error::{Error, Result};

pub async fn run(config: &Config, args: WatchArgs) -> Result<()> {
    let client = open_client(config, !args.no_reconnect)?;
    let mut events = event_channel(&client);

    connect(&client).await?;

    let fallback = client.credentials().credential();
    let descriptor = match config.descriptor(
        args.subject.clone(),
        args.address.clone(),
        fallback.as_ref().and_then(|c| c.subject()),
    ) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            client.disconnect();
            return Err(e);
        }
    };
    info!("watching {:?}", descriptor);

    let outcome = match client.declare_interest(descriptor) {
        Ok(()) => stream(&client, &mut events, &args).await,
        Err(e) => Err(e.into()),
    };
    client.disconnect();
    outcome
}

/// Print events until interrupted, the count is reached or the client gives up.
async fn stream(
    client: &NotificationClient,
    events: &mut mpsc::UnboundedReceiver<Event>,
    args: &WatchArgs,
) -> Result<()> {
    let color = args.output == OutputFormat::Text && colors::should_colorize();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut seen = 0usize;

    loop {
        let event = tokio::select! {
            event = events.recv() => match event {
                Some(event) => event,
                None => return Ok(()),
            },
            _ = &mut ctrl_c => return Ok(()),
        };

        print_event(&event, args.output, color)?;

        match event {
            Event::ReconnectExhausted { attempts } => {
                return Err(ClientError::ReconnectExhausted { attempts }.into());
            }
            Event::Disconnected { ref reason }
                if reason.is_unplanned() && !client.config().auto_reconnect =>
            {
                return Err(Error::ConnectionLost(reason.to_string()));
            }
            _ => {}
        }

        if event.kind().is_domain() {
            seen += 1;
            if args.count.is_some_and(|n| seen >= n) {
                return Ok(());
            }
        }
    }
}

fn print_event(event: &Event, output: OutputFormat, color: bool) -> Result<()> {
    match (output, event.server_message()) {
        (OutputFormat::Json, Some(msg)) => println!("{}", msg.to_json()?),
        (OutputFormat::Json, None) => eprintln!("{}", display::format_line(event, false)),
        (OutputFormat::Text, _) => println!("{}", display::format_line(event, color)),
    }
    Ok(())
}
