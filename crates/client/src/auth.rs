// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credential accessor.
//!
//! Hands out whatever token is current: one set explicitly on the store, or
//! otherwise the one persisted on disk by the login flow. The file is read
//! on every call so a token refreshed by another process is picked up on
//! the next connect attempt. No network calls happen here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use mp_core::Credential;
use tracing::{debug, warn};

use crate::error::ClientResult;

const APP_DIR_NAME: &str = "mailpulse";
const TOKEN_FILE_NAME: &str = "token";

/// Source of the bearer credential presented at handshake time.
#[derive(Debug, Default)]
pub struct CredentialStore {
    explicit: RwLock<Option<Credential>>,
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store with no persisted fallback.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store falling back to the token file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        CredentialStore {
            explicit: RwLock::new(None),
            path: Some(path.into()),
        }
    }

    /// Default token file location (`$XDG_CONFIG_HOME/mailpulse/token`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the token used on the next connect attempt.
    ///
    /// An already-open connection keeps the token it was opened with.
    pub fn set_credential(&self, token: impl Into<String>) -> ClientResult<Credential> {
        let credential = Credential::new(token)?;
        *self
            .explicit
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        debug!("credential replaced");
        Ok(credential)
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        if let Some(credential) = self
            .explicit
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Some(credential);
        }
        self.load_persisted()
    }

    /// Write the token to the persisted location.
    pub fn persist(&self, token: impl Into<String>) -> ClientResult<Credential> {
        let credential = Credential::new(token)?;
        let path = self.path.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no token file location configured")
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}\n", credential.token()))?;
        restrict_permissions(path)?;
        Ok(credential)
    }

    /// Forget the explicit token and remove the persisted one.
    pub fn clear(&self) -> ClientResult<()> {
        *self
            .explicit
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(ref path) = self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn load_persisted(&self) -> Option<Credential> {
        let path = self.path.as_ref()?;
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("cannot read token file {}: {}", path.display(), e);
                return None;
            }
        };
        match Credential::new(contents) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("ignoring token file {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
