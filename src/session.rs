//! # Map Session
//!
//! Drives the repository on behalf of the map: initial load on mount,
//! user queries, refreshes and teardown. Results land in the shared
//! [`ViewModelStore`]; responses arriving after a retarget or unmount are
//! discarded there.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use transit_api::Repository;
use transit_core::HttpRequest;
use view_model::{ResourceKind, Snapshot, ViewModelStore};

#[derive(Debug, Default)]
struct Targets {
    alternatives: Option<(String, String)>,
    coverage: Option<String>,
}

pub struct MapSession<H: HttpRequest> {
    repository: Repository<H>,
    store: ViewModelStore,
    targets: Mutex<Targets>,
}

impl<H: HttpRequest> MapSession<H> {
    #[must_use]
    pub fn new(repository: Repository<H>, store: ViewModelStore) -> Self {
        Self { repository, store, targets: Mutex::new(Targets::default()) }
    }

    /// The store backing this session. Clones share state, so a live
    /// channel can be attached to it.
    #[must_use]
    pub const fn store(&self) -> &ViewModelStore {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Load stops, routes, stats and areas concurrently.
    pub async fn mount(&self) {
        info!("mounting transit map");
        let (stops, routes, stats, areas) = futures::join!(
            self.refresh(ResourceKind::Stops),
            self.refresh(ResourceKind::Routes),
            self.refresh(ResourceKind::Stats),
            self.refresh(ResourceKind::Areas),
        );
        debug!(stops, routes, stats, areas, "mount complete");
    }

    /// Query alternatives between two stops, superseding any earlier query
    /// for a different pair. Repeated queries for the same pair apply in the
    /// order they resolve.
    ///
    /// Returns `false` when the result was discarded because a query for
    /// another pair or an unmount overtook it.
    pub async fn query_alternatives(&self, origin: &str, destination: &str) -> bool {
        let ticket = self.store.retarget(ResourceKind::Alternatives, &[origin, destination]);
        self.targets().alternatives = Some((origin.to_string(), destination.to_string()));

        let result = self.repository.get_alternative_routes(origin, destination).await;
        self.store.complete(ticket, result)
    }

    /// Query the coverage analysis of one area, superseding any earlier
    /// query for another area.
    pub async fn query_coverage(&self, area_id: &str) -> bool {
        let ticket = self.store.retarget(ResourceKind::Coverage, &[area_id]);
        self.targets().coverage = Some(area_id.to_string());

        let result = self.repository.get_coverage_analysis(area_id).await;
        self.store.complete(ticket, result)
    }

    /// Refetch `kind`, using the last query target for alternatives and
    /// coverage.
    ///
    /// Returns `false` without fetching when `kind` is already loading or has
    /// never been queried, or when the result was discarded.
    pub async fn refresh(&self, kind: ResourceKind) -> bool {
        let (alternatives, coverage) = {
            let targets = self.targets();
            (targets.alternatives.clone(), targets.coverage.clone())
        };

        match kind {
            ResourceKind::Stops => {
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                self.store.complete(ticket, self.repository.get_stops().await)
            }
            ResourceKind::Routes => {
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                self.store.complete(ticket, self.repository.get_routes().await)
            }
            ResourceKind::Stats => {
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                self.store.complete(ticket, self.repository.get_system_stats().await)
            }
            ResourceKind::Areas => {
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                self.store.complete(ticket, self.repository.get_areas().await)
            }
            ResourceKind::Alternatives => {
                let Some((origin, destination)) = alternatives else {
                    debug!(%kind, "nothing to refresh");
                    return false;
                };
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                let result = self.repository.get_alternative_routes(&origin, &destination).await;
                self.store.complete(ticket, result)
            }
            ResourceKind::Coverage => {
                let Some(area_id) = coverage else {
                    debug!(%kind, "nothing to refresh");
                    return false;
                };
                let Some(ticket) = self.store.begin_fetch(kind) else { return false };
                self.store.complete(ticket, self.repository.get_coverage_analysis(&area_id).await)
            }
        }
    }

    /// Invalidate every fetch in flight. Late responses are discarded.
    pub fn unmount(&self) {
        info!("unmounting transit map");
        self.store.cancel_all();
    }

    fn targets(&self) -> MutexGuard<'_, Targets> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
