// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use mp_client::ClientError;
use thiserror::Error;

/// Errors surfaced by mailpulse commands.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("config file not found: {}\n  hint: create it, or drop --config to use the defaults", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("no subject to watch\n  hint: pass --subject <id>, set subject_id in mailpulse.toml, or use a token with a 'sub' claim")]
    MissingSubject,

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("no token stored\n  hint: run 'mailpulse token set <token>'")]
    NoToken,

    #[error("cannot determine the config directory\n  hint: set token_file in mailpulse.toml or pass --config")]
    NoConfigDir,

    #[error("no {what} received within {}s", .waited.as_secs())]
    NoResponse {
        what: &'static str,
        waited: std::time::Duration,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<mp_core::Error> for Error {
    fn from(e: mp_core::Error) -> Self {
        Error::Client(ClientError::Credential(e))
    }
}

/// A specialized Result type for mailpulse commands.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
