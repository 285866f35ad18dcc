// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the notification client.

use std::time::Duration;

use crate::transport::TransportError;

/// Why a single connect attempt failed.
///
/// Cloneable so the same failure can be returned to the caller, handed to
/// concurrent waiters and carried by the `Error` lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Network, DNS, refused connection or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server refused the credential.
    #[error("authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// No acknowledgement arrived within the connect deadline.
    #[error("handshake timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A scheduled reconnect found no credential to present.
    #[error("no credential available")]
    CredentialUnavailable,
}

impl ConnectError {
    /// Returns true if only a refreshed credential can make the next attempt succeed.
    ///
    /// Classification only: every failure is retried with the same backoff.
    pub fn needs_credential(&self) -> bool {
        matches!(
            self,
            ConnectError::AuthenticationRejected(_) | ConnectError::CredentialUnavailable
        )
    }
}

impl From<TransportError> for ConnectError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Unauthorized(msg) => ConnectError::AuthenticationRejected(msg),
            other => ConnectError::Transport(other.to_string()),
        }
    }
}

/// Error type for notification client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No credential was available at connect time.
    #[error("authentication required: no credential available\n  hint: run 'mailpulse token set <token>' or call set_credential() first")]
    AuthenticationRequired,

    /// The connect attempt failed.
    #[error("connection failed: {0}")]
    Connect(#[from] ConnectError),

    /// Operation requires an open connection.
    #[error("not connected to notification server")]
    NotConnected,

    /// Automatic reconnection gave up.
    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// A disconnect() superseded the attempt.
    #[error("connection attempt cancelled by disconnect")]
    Cancelled,

    /// Credential could not be parsed or stored.
    #[error("{0}")]
    Credential(#[from] mp_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for notification client operations.
pub type ClientResult<T> = Result<T, ClientError>;
