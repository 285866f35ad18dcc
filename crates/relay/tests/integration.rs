// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the mp-relay binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use futures_util::StreamExt;
use mp_core::ServerMessage;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

/// Helper to spawn a relay process and clean it up on drop.
struct RelayProcess {
    child: Child,
    port: u16,
}

impl RelayProcess {
    fn spawn() -> Self {
        // Use a port range that's less likely to conflict
        let port = 49152 + (std::process::id() % 1000) as u16;

        let child = Command::new(env!("CARGO_BIN_EXE_mp-relay"))
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .arg("--token")
            .arg("integration-token")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn relay process");

        RelayProcess { child, port }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/notifications", self.port)
    }

    fn authorized_request(&self) -> Request {
        let mut request = self.ws_url().into_client_request().unwrap();
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer integration-token"),
        );
        request
    }
}

impl Drop for RelayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[tokio::test]
async fn test_relay_lifecycle() {
    let relay = RelayProcess::spawn();

    // Wait for the relay to start; CI runners can be slow
    let mut ws_stream = None;
    for _ in 0..20 {
        let attempt = connect_async(relay.authorized_request());
        if let Ok(Ok((stream, _))) =
            tokio::time::timeout(Duration::from_millis(500), attempt).await
        {
            ws_stream = Some(stream);
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    let mut ws_stream = ws_stream.expect("should connect to relay within retries");

    let frame = tokio::time::timeout(Duration::from_secs(5), ws_stream.next())
        .await
        .expect("ack within timeout")
        .expect("stream open")
        .unwrap();
    match frame {
        Message::Text(text) => {
            let msg = ServerMessage::from_json(&text).unwrap();
            assert!(matches!(msg, ServerMessage::ConnectionAck { .. }));
        }
        other => panic!("expected text frame, got {:?}", other),
    }
}
