// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mp-relay: local WebSocket relay speaking the mailpulse notification protocol.
//!
//! Authenticates connections by bearer token, tracks which rooms each
//! connection subscribed to and fans published events out to the members of
//! a room. Used to run the CLI locally and as the loopback server in
//! end-to-end tests; it is not a production backend.

pub mod demo;
pub mod server;
pub mod state;



#[cfg(test)]
mod state_tests;

pub use server::{run, serve};
pub use state::{RelayState, RoomMessage};
