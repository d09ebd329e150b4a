#![allow(missing_docs)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http::{Request, Response};
use serde_json::Value;
use transit_core::HttpRequest;

/// Serves canned responses keyed by request path and records every request.
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>,
    requests: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    refuse: bool,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_json(self, path: &str, body: &Value) -> Self {
        self.with_status(path, 200, body)
    }

    #[must_use]
    pub fn with_status(self, path: &str, status: u16, body: &Value) -> Self {
        let body = serde_json::to_vec(body).expect("should serialize");
        self.with_raw(path, status, body)
    }

    #[must_use]
    pub fn with_raw(self, path: &str, status: u16, body: Vec<u8>) -> Self {
        self.responses.lock().expect("should lock").insert(path.to_string(), (status, body));
        self
    }

    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[must_use]
    pub const fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    /// Request URIs (path and query) in the order they were made.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("should lock").clone()
    }
}

impl HttpRequest for MockProvider {
    async fn fetch(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>> {
        let uri = request.uri();
        let path_and_query = uri.path_and_query().map(ToString::to_string).unwrap_or_default();
        self.requests.lock().expect("should lock").push(path_and_query);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.refuse {
            return Err(anyhow!("connection refused"));
        }

        let (status, body) = self
            .responses
            .lock()
            .expect("should lock")
            .get(uri.path())
            .cloned()
            .unwrap_or_else(|| (404, br#"{"detail": "Not Found"}"#.to_vec()));

        Response::builder().status(status).body(Bytes::from(body)).context("failed to build response")
    }
}
