// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credentials presented at handshake time.
//!
//! The token itself is opaque to the client. When it is JWT-shaped, the
//! payload segment is decoded (without signature verification) so the
//! subject and expiry can be reported; anything else is accepted as-is and
//! carries no claims.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Claims derived from a JWT-shaped token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    /// The `sub` claim: the user the token was issued to.
    pub subject: Option<String>,
    /// The `exp` claim.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Claims {
    /// Decodes claims from the payload segment of `header.payload.signature`.
    ///
    /// Returns empty claims when the token is not a decodable JWT.
    pub fn decode(token: &str) -> Claims {
        let mut segments = token.split('.');
        let (Some(_), Some(payload), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Claims::default();
        };

        let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
            return Claims::default();
        };
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            return Claims::default();
        };

        Claims {
            subject: value
                .get("sub")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            expires_at: value
                .get("exp")
                .and_then(|v| v.as_i64())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

/// An opaque bearer token plus its derived claims.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    claims: Claims,
}

impl Credential {
    /// Creates a credential, rejecting empty tokens.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(Error::InvalidCredential("token is empty".to_string()));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(Error::InvalidCredential(
                "token contains whitespace".to_string(),
            ));
        }
        let claims = Claims::decode(&token);
        Ok(Credential { token, claims })
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Subject identifier, if the token carries one.
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject.as_deref()
    }

    /// Returns true if the token declares an expiry at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Returns true if the token has already expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
