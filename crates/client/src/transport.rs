// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Frame transport between the notification client and the relay.
//!
//! The client only sees typed [`ClientMessage`]s and [`ServerMessage`]s;
//! [`WebSocketTransport`] turns them into JSON text frames and tests swap
//! in a scripted implementation.
//!
//! The client opens a fresh transport for every connect attempt through a
//! [`Connector`], so a transport instance never outlives one session.

use std::future::Future;
use std::pin::Pin;

use mp_core::{ClientMessage, Credential, ServerMessage};
use tracing::{debug, warn};

/// Failures below the protocol level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server refused the upgrade because of the credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A frame could not be encoded.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// One connection's worth of framed, typed messaging.
pub trait Transport: Send + Sync {
    /// Connect to a remote server, presenting the credential in the handshake.
    fn connect<'a>(&'a mut self, url: &'a str, credential: &'a Credential)
        -> TransportFuture<'a, ()>;

    /// Close the connection. A no-op when not connected.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Encode and send one message.
    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()>;

    /// Next decodable message from the server.
    ///
    /// Returns `None` if the connection is closed. Must be cancel-safe: the
    /// client drops a pending `recv` whenever it has something to send.
    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>>;
}

/// Opens new transports, one per connect attempt.
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport + 'static;

    /// Create an unconnected transport.
    fn open(&self) -> Self::Transport;
}

/// Connector producing [`WebSocketTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    fn open(&self) -> WebSocketTransport {
        WebSocketTransport::new()
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// [`Transport`] over a tokio-tungstenite client connection.
pub struct WebSocketTransport {
    ws: Option<WebSocketConnection>,
}

struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect<'a>(
        &'a mut self,
        url: &'a str,
        credential: &'a Credential,
    ) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::client::IntoClientRequest;
            use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
            use tokio_tungstenite::tungstenite::Error as WsError;

            let mut request = url
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(format!("invalid url: {}", e)))?;
            let bearer = HeaderValue::from_str(&credential.bearer())
                .map_err(|e| TransportError::Unauthorized(format!("malformed token: {}", e)))?;
            request.headers_mut().insert(AUTHORIZATION, bearer);

            let ws_stream = match tokio_tungstenite::connect_async(request).await {
                Ok((stream, _)) => stream,
                Err(WsError::Http(response)) => {
                    let status = response.status();
                    return Err(match status.as_u16() {
                        401 | 403 => TransportError::Unauthorized(format!(
                            "server responded {}",
                            status
                        )),
                        _ => TransportError::ConnectionFailed(format!(
                            "server responded {}",
                            status
                        )),
                    });
                }
                Err(e) => return Err(TransportError::ConnectionFailed(e.to_string())),
            };

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            let json = msg
                .to_json()
                .map_err(|e| TransportError::SerializationError(e.to_string()))?;
            debug!("sending frame: {}", json);

            if let Err(e) = ws.sink.send(Message::Text(json.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => match ServerMessage::from_json(&text) {
                        Ok(msg) => return Ok(Some(msg)),
                        Err(e) => {
                            // Skip the frame, keep the session
                            warn!("skipping malformed frame: {}", e);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        debug!("server sent close frame: {:?}", frame);
                        self.ws = None;
                        return Ok(None);
                    }
                    Some(Ok(_)) => {
                        // Ping/pong is answered by tungstenite; binary frames are not part of the protocol
                        continue;
                    }
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.ws = None;
                        return Ok(None);
                    }
                }
            }
        })
    }
}
