// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for client tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::auth::CredentialStore;
use crate::client::NotificationClient;
use crate::config::ClientConfig;
use crate::event::{Event, EventKind};
use crate::transport::Connector;
use crate::transport_tests::MockConnector;

/// Client over a mock connector holding the token "test-token".
pub fn mock_client(connector: MockConnector) -> NotificationClient<MockConnector> {
    mock_client_with(ClientConfig::with_url("ws://relay.test/notifications"), connector)
}

/// Same as [`mock_client`] with a custom configuration.
pub fn mock_client_with(
    config: ClientConfig,
    connector: MockConnector,
) -> NotificationClient<MockConnector> {
    let credentials = Arc::new(CredentialStore::in_memory());
    credentials.set_credential("test-token").unwrap();
    NotificationClient::with_connector(config, credentials, connector)
}

/// Records every event a client dispatches.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn attach<C: Connector>(client: &NotificationClient<C>) -> Self {
        let recorder = Recorder::default();
        for kind in EventKind::ALL {
            let events = Arc::clone(&recorder.events);
            client.on(kind, move |event| events.lock().unwrap().push(event.clone()));
        }
        recorder
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(Event::kind).collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| event.kind() == kind)
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).len()
    }
}

/// Poll `condition` every 10ms until it holds, failing after 100s.
///
/// Under a paused clock the sleeps advance virtual time, so pending
/// reconnect timers fire while waiting.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
