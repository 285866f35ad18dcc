// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for mp-core operations.

use thiserror::Error;

/// All possible errors that can occur in mp-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid credential: {0}\n  hint: run 'mailpulse token set <token>' with the token issued at login")]
    InvalidCredential(String),
}

/// A specialized Result type for mp-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
