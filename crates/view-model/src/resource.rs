use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use transit_api::{AlternativeRoute, AreaIndex, CoverageAnalysis, Route, Stop, SystemStats};

/// The kinds of resource held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Stops,
    Routes,
    Alternatives,
    Coverage,
    Stats,
    Areas,
}

impl ResourceKind {
    pub const ALL: [Self; 6] =
        [Self::Stops, Self::Routes, Self::Alternatives, Self::Coverage, Self::Stats, Self::Areas];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stops => "stops",
            Self::Routes => "routes",
            Self::Alternatives => "alternatives",
            Self::Coverage => "coverage",
            Self::Stats => "stats",
            Self::Areas => "areas",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully fetched resource value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Stops(Vec<Stop>),
    Routes(Vec<Route>),
    Alternatives(Vec<AlternativeRoute>),
    Coverage(CoverageAnalysis),
    Stats(SystemStats),
    Areas(AreaIndex),
}

impl Resource {
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Stops(_) => ResourceKind::Stops,
            Self::Routes(_) => ResourceKind::Routes,
            Self::Alternatives(_) => ResourceKind::Alternatives,
            Self::Coverage(_) => ResourceKind::Coverage,
            Self::Stats(_) => ResourceKind::Stats,
            Self::Areas(_) => ResourceKind::Areas,
        }
    }
}

impl From<Vec<Stop>> for Resource {
    fn from(stops: Vec<Stop>) -> Self {
        Self::Stops(stops)
    }
}

impl From<Vec<Route>> for Resource {
    fn from(routes: Vec<Route>) -> Self {
        Self::Routes(routes)
    }
}

impl From<Vec<AlternativeRoute>> for Resource {
    fn from(alternatives: Vec<AlternativeRoute>) -> Self {
        Self::Alternatives(alternatives)
    }
}

impl From<CoverageAnalysis> for Resource {
    fn from(analysis: CoverageAnalysis) -> Self {
        Self::Coverage(analysis)
    }
}

impl From<SystemStats> for Resource {
    fn from(stats: SystemStats) -> Self {
        Self::Stats(stats)
    }
}

impl From<AreaIndex> for Resource {
    fn from(areas: AreaIndex) -> Self {
        Self::Areas(areas)
    }
}
