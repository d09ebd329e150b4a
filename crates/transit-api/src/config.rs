use std::borrow::Cow;
use std::time::Duration;

/// Backend resource paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub stops: Cow<'static, str>,
    pub routes: Cow<'static, str>,
    pub alternative_routes: Cow<'static, str>,
    pub coverage: Cow<'static, str>,
    pub stats: Cow<'static, str>,
    pub areas: Cow<'static, str>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stops: Cow::Borrowed("/api/debug/paradas"),
            routes: Cow::Borrowed("/api/rutas"),
            alternative_routes: Cow::Borrowed("/api/rutas/alternativas"),
            coverage: Cow::Borrowed("/api/cobertura"),
            stats: Cow::Borrowed("/api/debug/stats"),
            areas: Cow::Borrowed("/api/debug/agebs"),
        }
    }
}

/// Repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Scheme, host and port of the backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub timeout: Duration,
    /// Number of areas kept in the system stats ranking.
    pub top_areas: usize,
    pub endpoints: Endpoints,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(10),
            top_areas: 5,
            endpoints: Endpoints::default(),
        }
    }
}
