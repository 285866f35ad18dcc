// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.

use std::time::Duration;

use crate::history::HistoryPolicy;
use crate::reconnect::ReconnectPolicy;

/// Configuration for the notification client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the notification relay.
    pub url: String,
    /// Deadline for the upgrade plus the server's connection acknowledgement.
    pub connect_timeout: Duration,
    /// Reconnect automatically after unplanned disconnects.
    pub auto_reconnect: bool,
    /// Backoff between reconnect attempts.
    pub reconnect: ReconnectPolicy,
    /// Maximum events kept in the notification history (0 = disabled).
    pub history_limit: usize,
    /// Whether the history survives a disconnect.
    pub history_policy: HistoryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: "ws://localhost:7890/notifications".to_string(),
            connect_timeout: Duration::from_secs(15),
            auto_reconnect: true,
            reconnect: ReconnectPolicy::default(),
            history_limit: 100,
            history_policy: HistoryPolicy::Retain,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another relay.
    pub fn with_url(url: impl Into<String>) -> Self {
        ClientConfig {
            url: url.into(),
            ..Self::default()
        }
    }
}
