// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use chrono::Utc;
use mp_client::{Credential, CredentialStore};

use crate::cli::TokenCommand;
use crate::config::Config;
use crate::display::redact_token;
use crate::env::{self, vars};
use crate::error::{Error, Result};

pub fn run(command: TokenCommand, config: &Config) -> Result<()> {
    let path = config.token_path().ok_or(Error::NoConfigDir)?;
    let store = CredentialStore::with_path(&path);

    match command {
        TokenCommand::Set { token } => set(&store, &path, token),
        TokenCommand::Show => show(&store, &path),
        TokenCommand::Clear => clear(&store, &path),
    }
}

fn set(store: &CredentialStore, path: &Path, token: String) -> Result<()> {
    let credential = store.persist(token)?;
    println!("Token saved to {}", path.display());
    if let Some(subject) = credential.subject() {
        println!("subject: {}", subject);
    }
    if credential.is_expired() {
        eprintln!("warning: token has already expired");
    }
    Ok(())
}

fn show(store: &CredentialStore, path: &Path) -> Result<()> {
    let (credential, source) = match env::token() {
        Some(token) => (Credential::new(token)?, vars::MAILPULSE_TOKEN.to_string()),
        None => (
            store.credential().ok_or(Error::NoToken)?,
            path.display().to_string(),
        ),
    };
    println!("{}", describe(&credential, &source));
    Ok(())
}

fn clear(store: &CredentialStore, path: &Path) -> Result<()> {
    store.clear()?;
    println!("Token removed from {}", path.display());
    Ok(())
}

/// Redacted summary of a credential and where it came from.
pub(crate) fn describe(credential: &Credential, source: &str) -> String {
    let subject = credential.subject().unwrap_or("-");
    let expires = match credential.claims().expires_at {
        Some(at) => {
            let stamp = at.format("%Y-%m-%d %H:%M:%S UTC");
            if at <= Utc::now() {
                format!("{} (expired)", stamp)
            } else {
                stamp.to_string()
            }
        }
        None => "-".to_string(),
    };

    format!(
        "token:   {}\nsubject: {}\nexpires: {}\nsource:  {}",
        redact_token(credential.token()),
        subject,
        expires,
        source
    )
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
