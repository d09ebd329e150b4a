//! Environment driven configuration for the map client.

use std::borrow::Cow;
use std::env;
use std::time::Duration;

use live_channel::ChannelConfig;
use transit_api::{Endpoints, RepositoryConfig};
use view_model::StoreConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub store: StoreConfig,
    pub channel: ChannelConfig,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults for
    /// anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = RepositoryConfig::default();
        let base_url = env::var("TRANSIT_API_URL").unwrap_or_else(|_| {
            tracing::trace!("TRANSIT_API_URL not set, using default: {}", defaults.base_url);
            defaults.base_url.clone()
        });
        let timeout = Duration::from_secs(env_u64("TRANSIT_REQUEST_TIMEOUT_SECS", 10));
        let top_areas = env_usize("TRANSIT_TOP_AREAS", defaults.top_areas);

        let store = StoreConfig {
            max_pending_deltas: env_usize(
                "TRANSIT_DELTA_BUFFER",
                StoreConfig::default().max_pending_deltas,
            ),
            ..StoreConfig::default()
        };

        let channel = ChannelConfig {
            origin: base_url.clone(),
            path: env_path("TRANSIT_LIVE_PATH", ChannelConfig::default().path),
        };

        Self {
            repository: RepositoryConfig {
                base_url,
                timeout,
                top_areas,
                endpoints: endpoints_from_env(defaults.endpoints),
            },
            store,
            channel,
        }
    }
}

fn endpoints_from_env(defaults: Endpoints) -> Endpoints {
    Endpoints {
        stops: env_path("TRANSIT_PATH_STOPS", defaults.stops),
        routes: env_path("TRANSIT_PATH_ROUTES", defaults.routes),
        alternative_routes: env_path("TRANSIT_PATH_ALTERNATIVES", defaults.alternative_routes),
        coverage: env_path("TRANSIT_PATH_COVERAGE", defaults.coverage),
        stats: env_path("TRANSIT_PATH_STATS", defaults.stats),
        areas: env_path("TRANSIT_PATH_AREAS", defaults.areas),
    }
}

fn env_path(key: &str, default: Cow<'static, str>) -> Cow<'static, str> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map_or(default, Cow::Owned)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|value| value.parse::<usize>().ok()).unwrap_or(default)
}
