//! # Transport Repository
//!
//! Typed requests for each backend resource. Every call makes exactly one
//! attempt bounded by the configured timeout; retrying is left to callers.

use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http::header::ACCEPT;
use http::{Method, Request};
use serde::de::DeserializeOwned;
use tokio::time;
use tracing::{debug, warn};
use transit_core::{HttpRequest, Result, network, validation};
use urlencoding::encode;

use crate::config::RepositoryConfig;
use crate::envelope;
use crate::models::{AlternativeRoute, AreaIndex, CoverageAnalysis, Route, Stop, SystemStats};

/// Transit backend client.
pub struct Repository<H: HttpRequest> {
    http: Arc<H>,
    config: RepositoryConfig,
}

impl<H: HttpRequest> Clone for Repository<H> {
    fn clone(&self) -> Self {
        Self { http: Arc::clone(&self.http), config: self.config.clone() }
    }
}

impl<H: HttpRequest> Repository<H> {
    #[must_use]
    pub const fn new(http: Arc<H>, config: RepositoryConfig) -> Self {
        Self { http, config }
    }

    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Fetch the stops sample.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Schema` on an unexpected body.
    pub async fn get_stops(&self) -> Result<Vec<Stop>> {
        let path = &self.config.endpoints.stops;
        let body = self.get(path, None).await?;
        decode(path, &body, Some("sample_stops"))
    }

    /// Fetch all routes.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Schema` on an unexpected body.
    pub async fn get_routes(&self) -> Result<Vec<Route>> {
        let path = &self.config.endpoints.routes;
        let body = self.get(path, None).await?;
        decode(path, &body, Some("routes"))
    }

    /// Fetch alternatives for travelling from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// `Validation` when either identifier is empty, before any request is
    /// made. Otherwise as [`Self::get_stops`].
    pub async fn get_alternative_routes(
        &self, origin: &str, destination: &str,
    ) -> Result<Vec<AlternativeRoute>> {
        let origin = required("origin", origin)?;
        let destination = required("destination", destination)?;

        let path = &self.config.endpoints.alternative_routes;
        let query = format!("origen={}&destino={}", encode(origin), encode(destination));
        let body = self.get(path, Some(&query)).await?;
        decode(path, &body, Some("alternatives"))
    }

    /// Fetch the coverage analysis for one area.
    ///
    /// # Errors
    ///
    /// `Validation` when `area_id` is empty. Otherwise as [`Self::get_stops`].
    pub async fn get_coverage_analysis(&self, area_id: &str) -> Result<CoverageAnalysis> {
        let area_id = required("area id", area_id)?;

        let path =
            format!("{}/{}", self.config.endpoints.coverage.trim_end_matches('/'), encode(area_id));
        let body = self.get(&path, None).await?;
        decode(&path, &body, Some("analysis"))
    }

    /// Fetch system counters with the top areas ranked by capacity.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Schema` on an unexpected body.
    pub async fn get_system_stats(&self) -> Result<SystemStats> {
        let path = &self.config.endpoints.stats;
        let body = self.get(path, None).await?;
        let mut stats: SystemStats = decode(path, &body, None)?;
        stats.rank_top_areas(self.config.top_areas);
        Ok(stats)
    }

    /// Fetch the area identifiers available for coverage queries.
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Schema` on an unexpected body.
    pub async fn get_areas(&self) -> Result<AreaIndex> {
        let path = &self.config.endpoints.areas;
        let body = self.get(path, None).await?;
        decode(path, &body, None)
    }

    async fn get(&self, path: &str, query: Option<&str>) -> Result<Bytes> {
        let mut uri = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        if let Some(query) = query {
            uri.push('?');
            uri.push_str(query);
        }

        let request = Request::builder()
            .method(Method::GET)
            .uri(&uri)
            .header(ACCEPT, "application/json")
            .body(Vec::new())
            .map_err(|err| validation!("invalid request uri {uri}: {err}"))?;

        debug!(%uri, "requesting transit resource");

        let Ok(fetched) = time::timeout(self.config.timeout, self.http.fetch(request)).await
        else {
            warn!(monotonic_counter.request_timeouts = 1, path, "transit request timed out");
            return Err(network!(
                "request to {path} timed out after {}ms",
                self.config.timeout.as_millis()
            ));
        };

        let response = fetched.with_context(|| format!("requesting {path}")).inspect_err(|err| {
            warn!(monotonic_counter.request_failures = 1, path, error = %err, "transit request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = envelope::error_detail(response.body())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no detail").to_string());
            warn!(monotonic_counter.request_failures = 1, path, %status, "transit request rejected");
            return Err(network!("{path} returned {status}: {detail}"));
        }

        Ok(response.into_body())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8], key: Option<&str>) -> Result<T> {
    envelope::decode(body, key).inspect_err(|err| {
        warn!(monotonic_counter.schema_errors = 1, path, error = %err, "unexpected response body");
    })
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation!("{name} is required"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::required;

    #[test]
    fn blank_is_missing() {
        assert!(required("origin", "  ").is_err());
        assert_eq!(required("origin", " 101 ").ok(), Some("101"));
    }
}
