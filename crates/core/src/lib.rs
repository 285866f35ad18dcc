// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mp-core: Shared types for the mailpulse notification client.
//!
//! This crate provides the wire protocol spoken between the notification
//! client and the relay, the subscription descriptor, and bearer credentials
//! with their decoded claims. It performs no I/O.

pub mod credential;
pub mod error;
pub mod protocol;

pub use credential::{Claims, Credential};
pub use error::{Error, Result};
pub use protocol::{ClientMessage, ServerMessage, SubscriptionDescriptor};
