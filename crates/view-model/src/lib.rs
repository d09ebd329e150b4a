//! # View Model
//!
//! Client-side fetch state for the transit map. Each resource kind moves
//! through `Idle`, `Loading`, `Success` and `Failure`; live deltas are merged
//! into loaded values or held until the next full load.

mod delta;
mod fetch_state;
mod geometry;
mod resource;
mod snapshot;
mod store;

pub use self::delta::Delta;
pub use self::fetch_state::{FetchState, Status};
pub use self::geometry::{MapGeometry, Position, RouteLine, StopPoint};
pub use self::resource::{Resource, ResourceKind};
pub use self::snapshot::Snapshot;
pub use self::store::{DeltaOutcome, FetchTicket, StoreConfig, StoreEvent, ViewModelStore};
