// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `mailpulse.toml` loading and conversion to client settings.
//!
//! Every key is optional. The file is looked up at `--config`, then
//! `$MAILPULSE_CONFIG`, then `$XDG_CONFIG_HOME/mailpulse/mailpulse.toml`;
//! only an explicitly named file is required to exist.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mp_client::{
    ClientConfig, CredentialStore, HistoryPolicy, ReconnectPolicy, SubscriptionDescriptor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "mailpulse.toml";
const APP_DIR_NAME: &str = "mailpulse";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint of the notification relay.
    #[serde(default = "default_url")]
    pub url: String,

    /// Handshake deadline for each connect attempt.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// Base interval of the linear reconnect backoff.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Domain events kept in memory.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub clear_history_on_disconnect: bool,

    /// User whose triage stream `watch` follows when --subject is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    /// Mailbox to narrow the stream to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_address: Option<String>,

    /// Where the token is persisted. Defaults to the user config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

fn default_url() -> String {
    ClientConfig::default().url
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_history_limit() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: default_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            auto_reconnect: default_auto_reconnect(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            history_limit: default_history_limit(),
            clear_history_on_disconnect: false,
            subject_id: None,
            channel_address: None,
            token_file: None,
        }
    }
}

impl Config {
    /// Parse a config file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Load the explicit file, or the default location if it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = env::config_path() {
            return Self::load(&path);
        }
        match default_path() {
            Some(path) if path.is_file() => {
                debug!("loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Config::default()),
        }
    }

    /// Settings for the notification client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            auto_reconnect: self.auto_reconnect,
            reconnect: ReconnectPolicy {
                base_interval: Duration::from_millis(self.reconnect_interval_ms),
                max_attempts: self.max_reconnect_attempts,
            },
            history_limit: self.history_limit,
            history_policy: if self.clear_history_on_disconnect {
                HistoryPolicy::ClearOnDisconnect
            } else {
                HistoryPolicy::Retain
            },
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Token file location: `token_file`, or the user config directory.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(CredentialStore::default_path)
    }

    /// Credential store backed by the token file.
    ///
    /// `MAILPULSE_TOKEN` is installed on top when set.
    pub fn credential_store(&self) -> Result<CredentialStore> {
        let store = match self.token_path() {
            Some(path) => CredentialStore::with_path(path),
            None => CredentialStore::in_memory(),
        };
        if let Some(token) = env::token() {
            store.set_credential(token)?;
        }
        Ok(store)
    }

    /// Resolve what to watch: flags first, then this file, then `fallback_subject`.
    pub fn descriptor(
        &self,
        subject: Option<String>,
        address: Option<String>,
        fallback_subject: Option<&str>,
    ) -> Result<SubscriptionDescriptor> {
        let subject = subject
            .or_else(|| self.subject_id.clone())
            .or_else(|| fallback_subject.map(str::to_string))
            .filter(|s| !s.trim().is_empty())
            .ok_or(Error::MissingSubject)?;

        let descriptor = SubscriptionDescriptor::new(subject);
        Ok(match address.or_else(|| self.channel_address.clone()) {
            Some(address) => descriptor.with_address(address),
            None => descriptor,
        })
    }
}

/// `$XDG_CONFIG_HOME/mailpulse/mailpulse.toml` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
