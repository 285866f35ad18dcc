// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notification client: connection manager and subscription manager.
//!
//! Provides a high-level interface for:
//! - Connecting to the relay with the current bearer credential
//! - Declaring and retracting interest in a triage stream
//! - Dispatching inbound events to listeners
//! - Automatic reconnection with linear backoff
//!
//! # State machine
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──ack──► Connected
//!      ▲                          │                   │
//!      │                  failure/timeout     transport closed
//!      │                          ▼                   ▼
//!      └──── exhausted ◄──── Error ◄── backoff ── Disconnected
//! ```
//!
//! All manager state sits behind one mutex that is never held across an
//! `.await` or a listener call. Each live connection is owned by a spawned
//! session task; sessions and attempts carry an epoch so a stale one never
//! touches the state of its successor.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mp_core::{ClientMessage, Credential, ServerMessage, SubscriptionDescriptor};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::dispatch::{EventDispatcher, ListenerId};
use crate::error::{ClientError, ClientResult, ConnectError};
use crate::event::{DisconnectReason, Event, EventKind};
use crate::history::{HistoryPolicy, NotificationHistory};
use crate::reconnect::{NextAttempt, ReconnectState};
use crate::transport::{Connector, Transport, WebSocketConnector};

/// State of the client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Connected and acknowledged by the server.
    Connected,
    /// Last attempt failed; a reconnect is scheduled.
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification client handle.
///
/// Cheap to clone; all clones drive the same connection. Call
/// [`disconnect`](Self::disconnect) to stop it: background tasks keep the
/// client alive while a session or reconnect timer is running.
pub struct NotificationClient<C: Connector = WebSocketConnector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for NotificationClient<C> {
    fn clone(&self) -> Self {
        NotificationClient {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C> {
    config: ClientConfig,
    connector: C,
    credentials: Arc<CredentialStore>,
    dispatcher: EventDispatcher,
    history: Mutex<NotificationHistory>,
    manager: Mutex<ManagerState>,
    state_tx: watch::Sender<ConnectionState>,
}

#[derive(Default)]
struct ManagerState {
    connection: ConnectionState,
    reconnect: ReconnectState,
    /// Set by disconnect(); suppresses automatic reconnects.
    manual_disconnect: bool,
    /// Last declared interest, replayed on every connect.
    descriptor: Option<SubscriptionDescriptor>,
    /// Bumped by every attempt and every disconnect().
    epoch: u64,
    /// Cancels the in-flight attempt, if any.
    attempt: Option<CancellationToken>,
    session: Option<Session>,
    last_error: Option<ConnectError>,
    client_id: Option<String>,
}

/// Handle to the task owning a live transport.
struct Session {
    epoch: u64,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    cancel: CancellationToken,
}

/// Result of a completed handshake.
struct Handshake {
    client_id: String,
    ack: ServerMessage,
    /// Frames that arrived before the acknowledgement.
    backlog: Vec<ServerMessage>,
}

enum ConnectPlan {
    AlreadyConnected,
    Wait(watch::Receiver<ConnectionState>),
    Attempt {
        epoch: u64,
        credential: Credential,
        cancel: CancellationToken,
    },
}

enum ReconnectStep {
    Retry {
        attempt: u32,
        delay: std::time::Duration,
        timer: CancellationToken,
    },
    Exhausted {
        attempts: u32,
    },
}

impl NotificationClient<WebSocketConnector> {
    /// Create a client using the WebSocket transport.
    pub fn new(config: ClientConfig, credentials: Arc<CredentialStore>) -> Self {
        Self::with_connector(config, credentials, WebSocketConnector)
    }
}

impl<C: Connector> NotificationClient<C> {
    /// Create a client with a custom connector (for testing).
    pub fn with_connector(
        config: ClientConfig,
        credentials: Arc<CredentialStore>,
        connector: C,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let history = NotificationHistory::new(config.history_limit);

        NotificationClient {
            inner: Arc::new(Inner {
                config,
                connector,
                credentials,
                dispatcher: EventDispatcher::new(),
                history: Mutex::new(history),
                manager: Mutex::new(ManagerState::default()),
                state_tx,
            }),
        }
    }

    fn manager(&self) -> MutexGuard<'_, ManagerState> {
        self.inner
            .manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn history_guard(&self) -> MutexGuard<'_, NotificationHistory> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, st: &mut ManagerState, next: ConnectionState) {
        if st.connection != next {
            debug!("connection state {} -> {}", st.connection, next);
        }
        st.connection = next;
        self.inner.state_tx.send_replace(next);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.inner.credentials
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.manager().connection
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Reconnect attempts scheduled since the last clean connect.
    pub fn reconnect_attempts(&self) -> u32 {
        self.manager().reconnect.attempts()
    }

    /// Returns true while a reconnect timer is pending.
    pub fn reconnect_pending(&self) -> bool {
        self.manager().reconnect.is_pending()
    }

    /// Identifier the server assigned to the current connection.
    pub fn client_id(&self) -> Option<String> {
        self.manager().client_id.clone()
    }

    /// The interest replayed on reconnect, if any.
    pub fn subscription(&self) -> Option<SubscriptionDescriptor> {
        self.manager().descriptor.clone()
    }

    /// Replace the bearer token used on the next connect attempt.
    pub fn set_credential(&self, token: impl Into<String>) -> ClientResult<()> {
        self.inner.credentials.set_credential(token)?;
        Ok(())
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    /// Register a listener for one event kind.
    pub fn on(
        &self,
        kind: EventKind,
        listener: impl Fn(&Event) + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.dispatcher.on(kind, listener)
    }

    /// Remove one listener.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.inner.dispatcher.off(kind, id)
    }

    /// Remove the listeners of one kind, or all of them.
    pub fn remove_all_listeners(&self, kind: Option<EventKind>) {
        self.inner.dispatcher.remove_all(kind)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.dispatcher.listener_count(kind)
    }

    // ── History ─────────────────────────────────────────────────────────────

    /// Received triage events and notifications, oldest first.
    pub fn history(&self) -> Vec<Event> {
        self.history_guard().snapshot()
    }

    pub fn clear_history(&self) {
        self.history_guard().clear();
    }

    fn apply_history_policy(&self) {
        if self.inner.config.history_policy == HistoryPolicy::ClearOnDisconnect {
            self.history_guard().clear();
        }
    }

    fn emit(&self, event: Event) {
        if event.kind().is_domain() {
            self.history_guard().record(&event);
        }
        self.inner.dispatcher.dispatch(&event);
    }

    // ── Connection manager ──────────────────────────────────────────────────

    /// Connect to the relay.
    ///
    /// Resolves once the upgrade succeeded and the server acknowledged the
    /// connection. A no-op when already connected; when an attempt is already
    /// running, waits for its outcome instead of opening a second transport.
    pub async fn connect(&self) -> ClientResult<()> {
        let plan = {
            let mut st = self.manager();
            match st.connection {
                ConnectionState::Connected => ConnectPlan::AlreadyConnected,
                ConnectionState::Connecting => ConnectPlan::Wait(self.inner.state_tx.subscribe()),
                ConnectionState::Disconnected | ConnectionState::Error => {
                    let credential = self
                        .inner
                        .credentials
                        .credential()
                        .ok_or(ClientError::AuthenticationRequired)?;
                    st.manual_disconnect = false;
                    st.reconnect.reset();
                    let (epoch, cancel) = self.begin_attempt(&mut st);
                    ConnectPlan::Attempt {
                        epoch,
                        credential,
                        cancel,
                    }
                }
            }
        };

        match plan {
            ConnectPlan::AlreadyConnected => Ok(()),
            ConnectPlan::Wait(rx) => self.await_attempt(rx).await,
            ConnectPlan::Attempt {
                epoch,
                credential,
                cancel,
            } => self.run_attempt(epoch, credential, cancel).await,
        }
    }

    /// Disconnect from the relay. Idempotent.
    ///
    /// Cancels any pending reconnect and suppresses automatic reconnects
    /// until the next explicit [`connect`](Self::connect). Safe to call from
    /// inside a listener.
    pub fn disconnect(&self) {
        let previous = {
            let mut st = self.manager();
            st.manual_disconnect = true;
            st.epoch += 1;
            st.reconnect.reset();
            if let Some(attempt) = st.attempt.take() {
                attempt.cancel();
            }
            if let Some(session) = st.session.take() {
                session.cancel.cancel();
            }
            st.client_id = None;
            let previous = st.connection;
            self.set_state(&mut st, ConnectionState::Disconnected);
            previous
        };

        if previous != ConnectionState::Disconnected {
            info!("disconnected by client");
            self.apply_history_policy();
            self.emit(Event::Disconnected {
                reason: DisconnectReason::ClientRequested,
            });
        }
    }

    fn begin_attempt(&self, st: &mut ManagerState) -> (u64, CancellationToken) {
        st.epoch += 1;
        st.last_error = None;
        let cancel = CancellationToken::new();
        st.attempt = Some(cancel.clone());
        self.set_state(st, ConnectionState::Connecting);
        (st.epoch, cancel)
    }

    async fn await_attempt(&self, mut rx: watch::Receiver<ConnectionState>) -> ClientResult<()> {
        debug!("connect already in progress, waiting for its outcome");
        let outcome = rx
            .wait_for(|state| *state != ConnectionState::Connecting)
            .await
            .map(|state| *state);

        if matches!(outcome, Ok(ConnectionState::Connected)) {
            return Ok(());
        }
        match self.manager().last_error.clone() {
            Some(error) => Err(ClientError::Connect(error)),
            None => Err(ClientError::Cancelled),
        }
    }

    async fn run_attempt(
        &self,
        epoch: u64,
        credential: Credential,
        cancel: CancellationToken,
    ) -> ClientResult<()> {
        if credential.is_expired() {
            warn!("credential has expired; presenting it anyway");
        }

        let url = self.inner.config.url.clone();
        let deadline = self.inner.config.connect_timeout;
        let mut transport = self.inner.connector.open();
        info!("connecting to {}", url);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(deadline, handshake(&mut transport, &url, &credential)) => {
                Some(result.unwrap_or(Err(ConnectError::Timeout(deadline))))
            }
        };

        match outcome {
            None => {
                let _ = transport.disconnect().await;
                debug!("connect attempt cancelled");
                Err(ClientError::Cancelled)
            }
            Some(Ok(handshake)) => self.establish(epoch, transport, handshake).await,
            Some(Err(error)) => {
                let _ = transport.disconnect().await;
                self.attempt_failed(epoch, error)
            }
        }
    }

    async fn establish(
        &self,
        epoch: u64,
        mut transport: C::Transport,
        handshake: Handshake,
    ) -> ClientResult<()> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let current = {
            let mut st = self.manager();
            if st.epoch != epoch || st.manual_disconnect {
                false
            } else {
                st.attempt = None;
                st.reconnect.reset();
                st.last_error = None;
                st.client_id = Some(handshake.client_id.clone());
                if let Some(ref descriptor) = st.descriptor {
                    debug!("replaying subscription for {}", descriptor.subject_id);
                    let _ = outbound_tx.send(ClientMessage::subscribe(descriptor.clone()));
                }
                st.session = Some(Session {
                    epoch,
                    outbound: outbound_tx,
                    cancel: cancel.clone(),
                });
                self.set_state(&mut st, ConnectionState::Connected);
                true
            }
        };

        if !current {
            let _ = transport.disconnect().await;
            debug!("connect attempt superseded");
            return Err(ClientError::Cancelled);
        }

        info!("connected as {}", handshake.client_id);
        self.emit(Event::Connected {
            client_id: handshake.client_id,
        });
        self.emit(Event::Server(handshake.ack));
        for msg in handshake.backlog {
            self.emit(Event::Server(msg));
        }

        let client = self.clone();
        tokio::spawn(async move {
            client
                .run_session(epoch, transport, outbound_rx, cancel)
                .await;
        });
        Ok(())
    }

    fn attempt_failed(&self, epoch: u64, error: ConnectError) -> ClientResult<()> {
        let retry = {
            let mut st = self.manager();
            if st.epoch != epoch {
                return Err(ClientError::Cancelled);
            }
            st.attempt = None;
            self.fail(&mut st, error.clone())
        };

        if error.needs_credential() {
            warn!("connect attempt failed: {}; waiting for a refreshed credential", error);
        } else {
            warn!("connect attempt failed: {}", error);
        }
        self.emit(Event::Error {
            error: error.clone(),
        });
        if retry {
            self.schedule_reconnect();
        }
        Err(ClientError::Connect(error))
    }

    /// Record a failed attempt. Every failure kind is retried while
    /// auto-reconnect is on; returns true when a reconnect should be scheduled.
    fn fail(&self, st: &mut ManagerState, error: ConnectError) -> bool {
        st.last_error = Some(error);
        let retry = self.inner.config.auto_reconnect && !st.manual_disconnect;
        let next = if retry {
            ConnectionState::Error
        } else {
            ConnectionState::Disconnected
        };
        self.set_state(st, next);
        retry
    }

    async fn run_session(
        self,
        epoch: u64,
        mut transport: C::Transport,
        mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
        cancel: CancellationToken,
    ) {
        let reason = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    let _ = transport.disconnect().await;
                    debug!("session {} closed by client", epoch);
                    return;
                }

                Some(msg) = outbound.recv() => {
                    if let Err(e) = transport.send(msg).await {
                        break DisconnectReason::TransportError(e.to_string());
                    }
                }

                frame = transport.recv() => match frame {
                    Ok(Some(msg)) => {
                        debug!("received {}", msg.tag());
                        self.emit(Event::Server(msg));
                    }
                    Ok(None) => break DisconnectReason::ServerClosed,
                    Err(e) => break DisconnectReason::TransportError(e.to_string()),
                },
            }
        };

        let _ = transport.disconnect().await;
        self.session_ended(epoch, reason);
    }

    fn session_ended(&self, epoch: u64, reason: DisconnectReason) {
        let reconnect = {
            let mut st = self.manager();
            if st.session.as_ref().map(|s| s.epoch) != Some(epoch) {
                debug!("stale session {} ended", epoch);
                return;
            }
            st.session = None;
            st.client_id = None;
            self.set_state(&mut st, ConnectionState::Disconnected);
            self.inner.config.auto_reconnect && !st.manual_disconnect
        };

        warn!("connection lost: {}", reason);
        self.apply_history_policy();
        self.emit(Event::Disconnected { reason });
        if reconnect {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&self) {
        let policy = self.inner.config.reconnect;
        let step = {
            let mut st = self.manager();
            if st.manual_disconnect || !self.inner.config.auto_reconnect {
                return;
            }
            match st.reconnect.next(&policy) {
                NextAttempt::Nothing => return,
                NextAttempt::Exhausted { attempts } => {
                    self.set_state(&mut st, ConnectionState::Disconnected);
                    ReconnectStep::Exhausted { attempts }
                }
                NextAttempt::Schedule { attempt, delay } => {
                    let timer = CancellationToken::new();
                    st.reconnect.arm(timer.clone());
                    ReconnectStep::Retry {
                        attempt,
                        delay,
                        timer,
                    }
                }
            }
        };

        match step {
            ReconnectStep::Exhausted { attempts } => {
                warn!("giving up after {} reconnect attempts", attempts);
                self.emit(Event::ReconnectExhausted { attempts });
            }
            ReconnectStep::Retry {
                attempt,
                delay,
                timer,
            } => {
                info!(
                    "reconnect attempt {} scheduled in {}ms",
                    attempt,
                    delay.as_millis()
                );
                self.emit(Event::ReconnectScheduled { attempt, delay });

                let client = self.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = timer.cancelled() => {}
                        _ = tokio::time::sleep(delay) => client.reconnect_now(timer).await,
                    }
                });
            }
        }
    }

    async fn reconnect_now(&self, timer: CancellationToken) {
        let credential = self.inner.credentials.credential();

        let plan = {
            let mut st = self.manager();
            if !st.reconnect.fire(&timer) || st.manual_disconnect {
                return;
            }
            if matches!(
                st.connection,
                ConnectionState::Connected | ConnectionState::Connecting
            ) {
                return;
            }
            match credential {
                Some(credential) => {
                    let (epoch, cancel) = self.begin_attempt(&mut st);
                    Ok((epoch, credential, cancel))
                }
                None => Err(self.fail(&mut st, ConnectError::CredentialUnavailable)),
            }
        };

        match plan {
            Ok((epoch, credential, cancel)) => {
                // Failures are reported through events and rescheduled
                let _ = self.run_attempt(epoch, credential, cancel).await;
            }
            Err(retry) => {
                warn!("reconnect skipped: no credential available");
                self.emit(Event::Error {
                    error: ConnectError::CredentialUnavailable,
                });
                if retry {
                    self.schedule_reconnect();
                }
            }
        }
    }

    // ── Subscription manager ────────────────────────────────────────────────

    fn outbound(st: &ManagerState) -> ClientResult<&mpsc::UnboundedSender<ClientMessage>> {
        match (&st.session, st.connection) {
            (Some(session), ConnectionState::Connected) => Ok(&session.outbound),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Declare interest in a stream; replayed automatically after reconnects.
    pub fn declare_interest(&self, descriptor: SubscriptionDescriptor) -> ClientResult<()> {
        let mut st = self.manager();
        Self::outbound(&st)?
            .send(ClientMessage::subscribe(descriptor.clone()))
            .map_err(|_| ClientError::NotConnected)?;
        info!("declared interest in {}", descriptor.subject_id);
        st.descriptor = Some(descriptor);
        Ok(())
    }

    /// Retract interest in a stream.
    pub fn retract_interest(&self, descriptor: SubscriptionDescriptor) -> ClientResult<()> {
        let mut st = self.manager();
        Self::outbound(&st)?
            .send(ClientMessage::unsubscribe(descriptor.clone()))
            .map_err(|_| ClientError::NotConnected)?;
        if st.descriptor.as_ref() == Some(&descriptor) {
            st.descriptor = None;
        }
        info!("retracted interest in {}", descriptor.subject_id);
        Ok(())
    }

    /// Ask the server to describe this connection.
    pub fn request_status(&self) -> ClientResult<()> {
        self.send(ClientMessage::status_request())
    }

    /// Ask the server to push a test notification back.
    pub fn test_ping(&self) -> ClientResult<()> {
        self.send(ClientMessage::test_ping())
    }

    fn send(&self, msg: ClientMessage) -> ClientResult<()> {
        let st = self.manager();
        Self::outbound(&st)?
            .send(msg)
            .map_err(|_| ClientError::NotConnected)
    }
}

/// Upgrade the transport and wait for the server's acknowledgement.
async fn handshake<T: Transport>(
    transport: &mut T,
    url: &str,
    credential: &Credential,
) -> Result<Handshake, ConnectError> {
    transport.connect(url, credential).await?;

    let mut backlog = Vec::new();
    loop {
        match transport.recv().await? {
            Some(ServerMessage::ConnectionAck {
                message,
                client_id,
                timestamp,
            }) => {
                let ack = ServerMessage::ConnectionAck {
                    message,
                    client_id: client_id.clone(),
                    timestamp,
                };
                return Ok(Handshake {
                    client_id,
                    ack,
                    backlog,
                });
            }
            Some(ServerMessage::Error { message }) => {
                return Err(ConnectError::AuthenticationRejected(message));
            }
            Some(other) => backlog.push(other),
            None => {
                return Err(ConnectError::Transport(
                    "connection closed before acknowledgement".to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
impl<C: Connector> NotificationClient<C> {
    /// Number of listener registrations held by the dispatcher, all kinds.
    pub(crate) fn total_listeners(&self) -> usize {
        EventKind::ALL
            .iter()
            .map(|kind| self.listener_count(*kind))
            .sum()
    }
}
