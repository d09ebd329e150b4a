//! Read-only view of the store handed to the map renderer.

use serde::Serialize;
use transit_api::{AlternativeRoute, AreaIndex, CoverageAnalysis, Route, Stop, SystemStats};
use transit_core::Error;

use crate::fetch_state::{FetchState, Status};
use crate::geometry::MapGeometry;
use crate::resource::{Resource, ResourceKind};

/// Point-in-time copy of every resource's fetch state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub stops: FetchState<Vec<Stop>>,
    pub routes: FetchState<Vec<Route>>,
    pub alternatives: FetchState<Vec<AlternativeRoute>>,
    pub coverage: FetchState<CoverageAnalysis>,
    pub stats: FetchState<SystemStats>,
    pub areas: FetchState<AreaIndex>,
}

impl Snapshot {
    pub(crate) fn from_states(
        states: impl IntoIterator<Item = (ResourceKind, FetchState<Resource>)>,
    ) -> Self {
        let mut snapshot = Self::default();
        for (kind, state) in states {
            match kind {
                ResourceKind::Stops => {
                    snapshot.stops = typed(state, |resource| match resource {
                        Resource::Stops(stops) => Some(stops),
                        _ => None,
                    });
                }
                ResourceKind::Routes => {
                    snapshot.routes = typed(state, |resource| match resource {
                        Resource::Routes(routes) => Some(routes),
                        _ => None,
                    });
                }
                ResourceKind::Alternatives => {
                    snapshot.alternatives = typed(state, |resource| match resource {
                        Resource::Alternatives(alternatives) => Some(alternatives),
                        _ => None,
                    });
                }
                ResourceKind::Coverage => {
                    snapshot.coverage = typed(state, |resource| match resource {
                        Resource::Coverage(analysis) => Some(analysis),
                        _ => None,
                    });
                }
                ResourceKind::Stats => {
                    snapshot.stats = typed(state, |resource| match resource {
                        Resource::Stats(stats) => Some(stats),
                        _ => None,
                    });
                }
                ResourceKind::Areas => {
                    snapshot.areas = typed(state, |resource| match resource {
                        Resource::Areas(areas) => Some(areas),
                        _ => None,
                    });
                }
            }
        }
        snapshot
    }

    #[must_use]
    pub const fn status(&self, kind: ResourceKind) -> Status {
        match kind {
            ResourceKind::Stops => self.stops.status(),
            ResourceKind::Routes => self.routes.status(),
            ResourceKind::Alternatives => self.alternatives.status(),
            ResourceKind::Coverage => self.coverage.status(),
            ResourceKind::Stats => self.stats.status(),
            ResourceKind::Areas => self.areas.status(),
        }
    }

    /// Whether any resource is still loading.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        ResourceKind::ALL.into_iter().any(|kind| self.status(kind) == Status::Loading)
    }

    /// Every failed resource with its reason, for retry affordances.
    #[must_use]
    pub fn failures(&self) -> Vec<(ResourceKind, &Error)> {
        let errors = [
            (ResourceKind::Stops, self.stops.error()),
            (ResourceKind::Routes, self.routes.error()),
            (ResourceKind::Alternatives, self.alternatives.error()),
            (ResourceKind::Coverage, self.coverage.error()),
            (ResourceKind::Stats, self.stats.error()),
            (ResourceKind::Areas, self.areas.error()),
        ];
        errors.into_iter().filter_map(|(kind, err)| err.map(|err| (kind, err))).collect()
    }

    /// Drawable geometry derived from the loaded stops and alternatives.
    #[must_use]
    pub fn geometry(&self) -> MapGeometry {
        let stops = self.stops.value().map_or(&[][..], Vec::as_slice);
        let alternatives = self.alternatives.value().map_or(&[][..], Vec::as_slice);
        MapGeometry::build(stops, alternatives)
    }
}

fn typed<T>(
    state: FetchState<Resource>, extract: impl FnOnce(Resource) -> Option<T>,
) -> FetchState<T> {
    match state {
        FetchState::Idle => FetchState::Idle,
        FetchState::Loading => FetchState::Loading,
        FetchState::Success(resource) => {
            extract(resource).map_or(FetchState::Idle, FetchState::Success)
        }
        FetchState::Failure(err) => FetchState::Failure(err),
    }
}
