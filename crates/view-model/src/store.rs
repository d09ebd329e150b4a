//! # View Model Store
//!
//! Holds the authoritative [`FetchState`] of every resource kind and
//! broadcasts each visible change to subscribers.
//!
//! Locks are only held for the duration of a single transition and never
//! across an await point.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, warn};
use transit_core::{Error, schema};

use crate::delta::Delta;
use crate::fetch_state::{FetchState, Status};
use crate::resource::{Resource, ResourceKind};
use crate::snapshot::Snapshot;

/// Store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Live deltas held per kind while it is not loaded.
    pub max_pending_deltas: usize,
    /// Events buffered per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_pending_deltas: 256, event_capacity: 64 }
    }
}

/// A change visible to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The kind's fetch state changed tag.
    Transition { kind: ResourceKind, status: Status },
    /// A live delta was merged into the kind's loaded value.
    DeltaApplied { kind: ResourceKind },
}

/// What happened to a live delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    Applied,
    /// The kind is not loaded; the delta waits for the next full load.
    Buffered,
    /// The loaded value has nothing the delta applies to.
    Ignored,
}

/// Proof that a fetch is the active one for its kind.
///
/// Issued by [`ViewModelStore::begin_fetch`] and [`ViewModelStore::retarget`],
/// consumed by [`ViewModelStore::complete`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a fetch ticket must be completed or dropped deliberately"]
pub struct FetchTicket {
    kind: ResourceKind,
    generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[derive(Debug, Default)]
struct Entry {
    state: FetchState<Resource>,
    generation: u64,
    // query the current generation was issued for
    target: Option<Vec<String>>,
    // store sequence at which the current fetch was issued
    loading_since: Option<u64>,
    pending: VecDeque<Pending>,
}

#[derive(Debug)]
struct Pending {
    sequence: u64,
    delta: Delta,
}

#[derive(Debug)]
struct Inner {
    entries: BTreeMap<ResourceKind, Entry>,
    sequence: u64,
}

impl Inner {
    fn entry(&mut self, kind: ResourceKind) -> &mut Entry {
        self.entries.entry(kind).or_default()
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Shared handle to the view model. Clones refer to the same store.
#[derive(Debug, Clone)]
pub struct ViewModelStore {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<StoreEvent>,
    config: StoreConfig,
}

impl Default for ViewModelStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ViewModelStore {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let entries = ResourceKind::ALL.into_iter().map(|kind| (kind, Entry::default())).collect();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self { inner: Arc::new(Mutex::new(Inner { entries, sequence: 0 })), events, config }
    }

    /// Receive every visible change from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Current state of `kind`.
    #[must_use]
    pub fn state(&self, kind: ResourceKind) -> FetchState<Resource> {
        self.lock().entry(kind).state.clone()
    }

    /// A consistent copy of every kind, for one render pass.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        let states = inner.entries.iter().map(|(kind, entry)| (*kind, entry.state.clone()));
        Snapshot::from_states(states)
    }

    /// Number of live deltas waiting for `kind` to load.
    #[must_use]
    pub fn pending_deltas(&self, kind: ResourceKind) -> usize {
        self.lock().entry(kind).pending.len()
    }

    /// Enter `Loading` for `kind`.
    ///
    /// Returns `None`, changing nothing, when a fetch for `kind` is already
    /// in flight.
    pub fn begin_fetch(&self, kind: ResourceKind) -> Option<FetchTicket> {
        let mut inner = self.lock();
        if inner.entry(kind).state.is_loading() {
            debug!(%kind, "fetch already in flight, ignoring begin_fetch");
            return None;
        }
        Some(self.start_loading(&mut inner, kind))
    }

    /// Enter `Loading` for the query identified by `target`.
    ///
    /// A different target invalidates every fetch of `kind` still in flight.
    /// Fetches for the same target stay valid and complete in resolution
    /// order.
    pub fn retarget(&self, kind: ResourceKind, target: &[&str]) -> FetchTicket {
        let mut inner = self.lock();
        let entry = inner.entry(kind);

        let same_target = entry
            .target
            .as_ref()
            .is_some_and(|active| active.iter().map(String::as_str).eq(target.iter().copied()));
        if !same_target {
            debug!(%kind, ?target, "new query target");
            entry.generation += 1;
            entry.target = Some(target.iter().map(ToString::to_string).collect());
            entry.loading_since = None;
        }
        self.start_loading(&mut inner, kind)
    }

    /// Store `value` as the loaded state of its kind, whatever the prior
    /// state.
    pub fn resolve(&self, value: impl Into<Resource>) {
        let mut inner = self.lock();
        self.resolve_locked(&mut inner, value.into());
    }

    /// Store a failure for `kind`, discarding any previously loaded value.
    pub fn reject(&self, kind: ResourceKind, reason: Error) {
        let mut inner = self.lock();
        self.reject_locked(&mut inner, kind, reason);
    }

    /// Apply the result of a ticketed fetch.
    ///
    /// Returns `false` and leaves the store untouched when the ticket has
    /// been superseded by a retarget or cancellation. A value of the wrong
    /// kind fails the fetch with a schema error.
    pub fn complete<T: Into<Resource>>(
        &self, ticket: FetchTicket, result: transit_core::Result<T>,
    ) -> bool {
        let mut inner = self.lock();
        let kind = ticket.kind;
        if inner.entry(kind).generation != ticket.generation {
            debug!(monotonic_counter.stale_completions = 1, %kind, "discarding stale fetch result");
            return false;
        }

        match result {
            Ok(value) => {
                let value = value.into();
                let actual = value.kind();
                if actual == kind {
                    self.resolve_locked(&mut inner, value);
                } else {
                    warn!(%kind, %actual, "fetch result does not match ticket");
                    let reason = schema!("expected {kind} but the fetch returned {actual}");
                    self.reject_locked(&mut inner, kind, reason);
                }
            }
            Err(reason) => self.reject_locked(&mut inner, kind, reason),
        }
        true
    }

    /// Invalidate any fetch of `kind` in flight. A loading kind returns to
    /// `Idle`.
    pub fn cancel(&self, kind: ResourceKind) {
        let mut inner = self.lock();
        self.cancel_locked(&mut inner, kind);
    }

    /// [`Self::cancel`] every kind.
    pub fn cancel_all(&self) {
        let mut inner = self.lock();
        for kind in ResourceKind::ALL {
            self.cancel_locked(&mut inner, kind);
        }
    }

    /// Merge a live delta into its kind's loaded value, or hold it until the
    /// kind next loads.
    pub fn apply_live_delta(&self, delta: Delta) -> DeltaOutcome {
        let mut inner = self.lock();
        let kind = delta.kind();

        if inner.entry(kind).state.value().is_none() {
            let sequence = inner.next_sequence();
            let entry = inner.entry(kind);
            if entry.pending.len() >= self.config.max_pending_deltas {
                entry.pending.pop_front();
                warn!(monotonic_counter.dropped_deltas = 1, %kind, "pending delta buffer full");
            }
            entry.pending.push_back(Pending { sequence, delta });
            return DeltaOutcome::Buffered;
        }

        let FetchState::Success(resource) = &mut inner.entry(kind).state else {
            return DeltaOutcome::Buffered;
        };
        if !delta.merge_into(resource) {
            debug!(%kind, "live delta did not match loaded data");
            return DeltaOutcome::Ignored;
        }
        self.emit(StoreEvent::DeltaApplied { kind });
        DeltaOutcome::Applied
    }

    // tickets share the current generation; only a cancel or a new target
    // invalidates them
    fn start_loading(&self, inner: &mut Inner, kind: ResourceKind) -> FetchTicket {
        let sequence = inner.next_sequence();
        let entry = inner.entry(kind);
        if entry.loading_since.is_none() {
            entry.loading_since = Some(sequence);
        }
        let generation = entry.generation;

        if !entry.state.is_loading() {
            entry.state = FetchState::Loading;
            self.emit(StoreEvent::Transition { kind, status: Status::Loading });
        }
        FetchTicket { kind, generation }
    }

    fn resolve_locked(&self, inner: &mut Inner, mut value: Resource) {
        let kind = value.kind();
        let entry = inner.entry(kind);

        // deltas that arrived after this fetch was issued may be missing from
        // the response; anything older is superseded by it
        let since = entry.loading_since.take();
        let mut superseded = 0_usize;
        for Pending { sequence, delta } in entry.pending.drain(..) {
            if since.is_some_and(|since| sequence > since) {
                delta.merge_into(&mut value);
            } else {
                superseded += 1;
            }
        }
        if superseded > 0 {
            debug!(%kind, superseded, "discarding deltas superseded by full refresh");
        }

        entry.state = FetchState::Success(value);
        self.emit(StoreEvent::Transition { kind, status: Status::Success });
    }

    fn reject_locked(&self, inner: &mut Inner, kind: ResourceKind, reason: Error) {
        let entry = inner.entry(kind);
        entry.loading_since = None;
        entry.pending.clear();

        warn!(%kind, error = %reason, "resource fetch failed");
        entry.state = FetchState::Failure(reason);
        self.emit(StoreEvent::Transition { kind, status: Status::Failure });
    }

    fn cancel_locked(&self, inner: &mut Inner, kind: ResourceKind) {
        let entry = inner.entry(kind);
        entry.generation += 1;
        if entry.state.is_loading() {
            entry.loading_since = None;
            entry.state = FetchState::Idle;
            self.emit(StoreEvent::Transition { kind, status: Status::Idle });
        }
    }

    fn emit(&self, event: StoreEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
