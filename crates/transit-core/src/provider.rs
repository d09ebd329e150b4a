//! # Provider
//!
//! Provider defines external data interfaces for the crate. The host
//! application supplies the HTTP client and the live socket transport.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

/// The `HttpRequest` trait defines the behavior for fetching data from the
/// transit backend.
pub trait HttpRequest: Send + Sync {
    /// Make outbound HTTP request.
    ///
    /// Implementations return the response as received, including non-2xx
    /// statuses. Only transport failures are errors.
    fn fetch(
        &self, request: Request<Vec<u8>>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

/// A frame received on a live socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// An open, bidirectional live update socket.
#[async_trait]
pub trait LiveSocket: Send {
    /// Wait for the next inbound frame. `None` means the peer closed the
    /// socket.
    async fn next_frame(&mut self) -> Option<Result<Frame>>;

    /// Send a text frame to the peer.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the socket.
    async fn close(&mut self) -> Result<()>;
}

/// The `SocketConnector` trait opens live sockets against a `ws://` or
/// `wss://` endpoint.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn LiveSocket>>;
}
