// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Handles the authenticated upgrade, per-connection room membership and
//! fanout of room broadcasts.

use std::collections::BTreeSet;
use std::net::SocketAddr;

use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use mp_core::{ClientMessage, ServerMessage};

use crate::state::RelayState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Run the relay on the given address.
pub async fn run(addr: SocketAddr, state: RelayState) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await
}

/// Accept connections from an already bound listener until shutdown.
pub async fn serve(listener: TcpListener, state: RelayState) -> Result<(), BoxError> {
    let mut shutdown = state.shutdown_signal();

    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = closing(&mut shutdown) => {
                info!("No longer accepting connections");
                return Ok(());
            }
        };
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Resolves once the relay is shutting down.
async fn closing(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|closing| *closing).await;
}

/// Per-connection bookkeeping.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) client_id: String,
    pub(crate) rooms: BTreeSet<String>,
}

impl Session {
    pub(crate) fn new(client_id: String) -> Self {
        Session {
            client_id,
            rooms: BTreeSet::new(),
        }
    }

    fn room_list(&self) -> Vec<String> {
        self.rooms.iter().cloned().collect()
    }
}

/// Extracts the bearer token from the upgrade request.
pub(crate) fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn unauthorized(reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: RelayState,
) -> Result<(), BoxError> {
    let ws_stream =
        tokio_tungstenite::accept_hdr_async(stream, |request: &Request, response: Response| {
            match bearer_token(request) {
                Some(token) if state.authorize(token) => Ok(response),
                Some(_) => {
                    warn!("Rejected invalid token from {}", peer_addr);
                    Err(unauthorized("invalid bearer token"))
                }
                None => {
                    warn!("Rejected unauthenticated connection from {}", peer_addr);
                    Err(unauthorized("missing bearer token"))
                }
            }
        })
        .await?;

    let mut session = Session::new(state.next_client_id());
    let _peer = state.peer_joined();
    info!(
        "New WebSocket connection from: {} ({})",
        peer_addr, session.client_id
    );

    let (mut ws_sink, mut ws_stream) = ws_stream.split();
    let mut shutdown = state.shutdown_signal();

    // Subscribe before acking so nothing published after the ack is missed
    let mut broadcast_rx = state.subscribe();
    send(&mut ws_sink, &ServerMessage::connection_ack(&session.client_id)).await?;

    loop {
        tokio::select! {
            _ = closing(&mut shutdown) => {
                info!("Closing connection to {} for shutdown", peer_addr);
                let _ = ws_sink.send(Message::Close(None)).await;
                break;
            }

            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_client_message(&text, &mut session, &state);
                        send(&mut ws_sink, &reply).await?;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", peer_addr);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(_)) => {
                        // Ignore other message types (Binary, Pong, Frame)
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                    None => {
                        info!("Client {} stream ended", peer_addr);
                        break;
                    }
                }
            }

            broadcast = broadcast_rx.recv() => {
                match broadcast {
                    Ok(room_message) if session.rooms.contains(&room_message.room) => {
                        if let Err(e) = send(&mut ws_sink, &room_message.message).await {
                            warn!("Failed to send broadcast to {}: {}", peer_addr, e);
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client {} lagged by {} messages", peer_addr, n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

async fn send(sink: &mut WsSink, msg: &ServerMessage) -> Result<(), BoxError> {
    let json = msg.to_json()?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}

/// Process a client message and return the reply.
pub(crate) fn handle_client_message(
    text: &str,
    session: &mut Session,
    state: &RelayState,
) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Malformed message from {}: {}", session.client_id, e);
            return ServerMessage::error(format!("invalid message: {}", e));
        }
    };
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::Subscribe(descriptor) => {
            session.rooms.extend(descriptor.rooms());
            info!(
                "{} subscribed to {}",
                session.client_id, descriptor.subject_id
            );
            ServerMessage::subscription_ack(&descriptor, session.room_list())
        }

        ClientMessage::Unsubscribe(descriptor) => {
            for room in descriptor.rooms() {
                session.rooms.remove(&room);
            }
            info!(
                "{} unsubscribed from {}",
                session.client_id, descriptor.subject_id
            );
            ServerMessage::notification(
                "unsubscribed",
                format!("unsubscribed from notifications for {}", descriptor.subject_id),
            )
        }

        ClientMessage::StatusRequest => ServerMessage::StatusResponse {
            client_id: session.client_id.clone(),
            peer_count: state.peer_count(),
            rooms: session.room_list(),
            timestamp: Utc::now(),
        },

        ClientMessage::TestPing => {
            ServerMessage::notification("test", "test notification from relay")
        }
    }
}
