// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session client registry.
//!
//! Hands out one [`NotificationClient`] per session key so that every part
//! of an application bound to the same session shares a single connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::auth::CredentialStore;
use crate::client::NotificationClient;
use crate::config::ClientConfig;
use crate::transport::{Connector, WebSocketConnector};

/// Creates and caches clients keyed by session.
pub struct ClientFactory<C: Connector + Clone = WebSocketConnector> {
    config: ClientConfig,
    connector: C,
    credentials: Arc<CredentialStore>,
    clients: Mutex<HashMap<String, NotificationClient<C>>>,
}

impl ClientFactory<WebSocketConnector> {
    pub fn new(config: ClientConfig, credentials: Arc<CredentialStore>) -> Self {
        Self::with_connector(config, credentials, WebSocketConnector)
    }
}

impl<C: Connector + Clone> ClientFactory<C> {
    pub fn with_connector(
        config: ClientConfig,
        credentials: Arc<CredentialStore>,
        connector: C,
    ) -> Self {
        ClientFactory {
            config,
            connector,
            credentials,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<String, NotificationClient<C>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The client for `session`, created on first use.
    pub fn client(&self, session: &str) -> NotificationClient<C> {
        self.clients()
            .entry(session.to_string())
            .or_insert_with(|| {
                debug!("creating notification client for session {}", session);
                NotificationClient::with_connector(
                    self.config.clone(),
                    Arc::clone(&self.credentials),
                    self.connector.clone(),
                )
            })
            .clone()
    }

    /// Disconnect and forget the client for `session`.
    ///
    /// Returns false if no client existed.
    pub fn remove(&self, session: &str) -> bool {
        let removed = self.clients().remove(session);
        match removed {
            Some(client) => {
                client.disconnect();
                true
            }
            None => false,
        }
    }

    /// Disconnect and forget every client.
    pub fn shutdown(&self) {
        let clients: Vec<_> = self.clients().drain().map(|(_, client)| client).collect();
        for client in clients {
            client.disconnect();
        }
    }

    pub fn len(&self) -> usize {
        self.clients().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients().is_empty()
    }
}
