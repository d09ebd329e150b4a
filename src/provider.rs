//! Host transports: HTTP backed by `reqwest`, live sockets backed by
//! `tokio-tungstenite`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::{Request, Response};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use transit_core::{Frame, HttpRequest, LiveSocket, SocketConnector};

/// Host HTTP client used by the repository.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client whose connections give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

impl HttpRequest for HttpClient {
    async fn fetch(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>> {
        tracing::debug!("request: {} {}", request.method(), request.uri());

        let request = reqwest::Request::try_from(request).context("converting request")?;
        let response = self.client.execute(request).await.context("sending request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.context("reading response body")?;

        let mut builder = Response::builder().status(status);
        if let Some(target) = builder.headers_mut() {
            *target = headers;
        }
        builder.body(body).context("building response")
    }
}

/// Opens WebSocket connections to the backend's live endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl SocketConnector for WsConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn LiveSocket>> {
        let (stream, response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .with_context(|| format!("opening websocket {endpoint}"))?;
        tracing::debug!(status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsSocket { stream }))
    }
}

struct WsSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl LiveSocket for WsSocket {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(err) => return Some(Err(anyhow::Error::new(err).context("reading websocket"))),
            };
            match message {
                Message::Text(text) => return Some(Ok(Frame::Text(text.as_str().to_owned()))),
                Message::Binary(bytes) => return Some(Ok(Frame::Binary(bytes.to_vec()))),
                Message::Close(_) => return None,
                // control frames are answered by the stream itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::text(text)).await.context("sending websocket frame")
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await.context("closing websocket")
    }
}
