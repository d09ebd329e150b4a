//! # Live Update Channel
//!
//! A single socket to the backend's live endpoint. The channel does not
//! reconnect on its own; after the socket drops it is `Disconnected` until
//! [`LiveChannel::connect`] is called again.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

use tracing::{debug, info, warn};
use transit_core::{Error, Frame, LiveSocket, Result, SocketConnector, channel_parse, validation};
use view_model::{DeltaOutcome, ViewModelStore};

use crate::endpoint::live_endpoint;
use crate::message::{RouteStatusUpdate, parse_message};

/// Channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Origin the map was served from, e.g. `http://localhost:8000`.
    pub origin: String,
    pub path: Cow<'static, str>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { origin: "http://localhost:8000".to_string(), path: Cow::Borrowed("/ws/va-y-ven") }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    /// Torn down; the channel cannot be reopened.
    Closed,
}

impl Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Receives live updates and merges them into the view model store.
pub struct LiveChannel<C: SocketConnector> {
    connector: Arc<C>,
    store: ViewModelStore,
    endpoint: String,
    state: ChannelState,
    socket: Option<Box<dyn LiveSocket>>,
}

impl<C: SocketConnector> LiveChannel<C> {
    /// Create a disconnected channel.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no live endpoint can be derived from
    /// the configured origin.
    pub fn new(connector: Arc<C>, store: ViewModelStore, config: &ChannelConfig) -> Result<Self> {
        let endpoint = live_endpoint(&config.origin, &config.path)?;
        Ok(Self { connector, store, endpoint, state: ChannelState::Disconnected, socket: None })
    }

    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open the socket. Connecting an already connected channel does nothing.
    ///
    /// # Errors
    ///
    /// Returns a network error when the connection cannot be opened, leaving
    /// the channel `Disconnected`, or a validation error once torn down.
    pub async fn connect(&mut self) -> Result<()> {
        match self.state {
            ChannelState::Connected => return Ok(()),
            ChannelState::Closed => return Err(validation!("channel has been torn down")),
            ChannelState::Disconnected | ChannelState::Connecting => {}
        }

        self.state = ChannelState::Connecting;
        debug!(endpoint = %self.endpoint, "connecting live channel");

        match self.connector.connect(&self.endpoint).await {
            Ok(socket) => {
                self.socket = Some(socket);
                self.state = ChannelState::Connected;
                info!(endpoint = %self.endpoint, "live channel connected");
                Ok(())
            }
            Err(err) => {
                self.state = ChannelState::Disconnected;
                let err = Error::from(err.context(format!("connecting to {}", self.endpoint)));
                warn!(monotonic_counter.live_connect_failures = 1, error = %err, "live channel connect failed");
                Err(err)
            }
        }
    }

    /// Wait for the next inbound message and apply it to the store.
    ///
    /// Returns `None` once the socket is gone, leaving the channel
    /// `Disconnected`. A malformed message yields a channel parse error; it
    /// is dropped and the channel stays `Connected`.
    pub async fn receive(&mut self) -> Option<Result<DeltaOutcome>> {
        let socket = self.socket.as_mut()?;

        match socket.next_frame().await {
            Some(Ok(frame)) => Some(self.handle_frame(frame)),
            Some(Err(err)) => {
                let err = Error::from(err.context("reading live frame"));
                warn!(error = %err, "live socket failed");
                self.drop_socket().await;
                Some(Err(err))
            }
            None => {
                info!(endpoint = %self.endpoint, "live channel closed by peer");
                self.drop_socket().await;
                None
            }
        }
    }

    /// Apply inbound messages until the socket goes away.
    pub async fn run(&mut self) {
        while self.receive().await.is_some() {}
    }

    /// Parse one inbound text message and apply it to the store.
    ///
    /// # Errors
    ///
    /// Returns a channel parse error when the message is malformed; the
    /// store is left untouched.
    pub fn handle_message(&self, text: &str) -> Result<DeltaOutcome> {
        let delta = parse_message(text).inspect_err(|err| {
            warn!(monotonic_counter.dropped_live_messages = 1, error = %err, "dropping live message");
        })?;

        let kind = delta.kind();
        let outcome = self.store.apply_live_delta(delta);
        debug!(%kind, ?outcome, "live delta received");
        Ok(outcome)
    }

    /// Publish a route status; the backend rebroadcasts it to every client.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty ids or when the channel is not
    /// connected, and a network error when the frame cannot be sent.
    pub async fn send_route_status(&mut self, route_id: &str, status: &str) -> Result<()> {
        let route_id = route_id.trim();
        let status = status.trim();
        if route_id.is_empty() || status.is_empty() {
            return Err(validation!("route id and status are required"));
        }
        let Some(socket) = self.socket.as_mut() else {
            return Err(validation!("live channel is {}", self.state));
        };

        let update = RouteStatusUpdate {
            route_id: route_id.to_string(),
            status: status.to_string(),
            timestamp: None,
        };
        let text = serde_json::to_string(&update)?;
        socket.send_text(text).await.map_err(|err| Error::from(err.context("sending route status")))
    }

    /// Close the socket for good. Further connects are refused.
    ///
    /// # Errors
    ///
    /// Returns a network error when the socket does not close cleanly; the
    /// channel is `Closed` regardless.
    pub async fn teardown(&mut self) -> Result<()> {
        self.state = ChannelState::Closed;
        let Some(mut socket) = self.socket.take() else {
            return Ok(());
        };
        info!(endpoint = %self.endpoint, "tearing down live channel");
        socket.close().await.map_err(|err| Error::from(err.context("closing live socket")))
    }

    fn handle_frame(&self, frame: Frame) -> Result<DeltaOutcome> {
        match frame {
            Frame::Text(text) => self.handle_message(&text),
            Frame::Binary(bytes) => {
                let text = String::from_utf8(bytes).map_err(|err| {
                    let err = channel_parse!("binary frame is not utf-8: {err}");
                    warn!(monotonic_counter.dropped_live_messages = 1, error = %err, "dropping live message");
                    err
                })?;
                self.handle_message(&text)
            }
        }
    }

    async fn drop_socket(&mut self) {
        if let Some(mut socket) = self.socket.take()
            && let Err(err) = socket.close().await
        {
            debug!(error = %err, "closing dropped socket");
        }
        if self.state != ChannelState::Closed {
            self.state = ChannelState::Disconnected;
        }
    }
}
