//! Incremental updates pushed by the backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use transit_api::{CoverageAnalysis, Route, Stop};

use crate::resource::{Resource, ResourceKind};

/// An incremental update merged into a resource that is already loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delta {
    /// Insert or replace stops by id, then drop the removed ids.
    Stops {
        #[serde(default)]
        upsert: Vec<Stop>,
        #[serde(default)]
        remove: Vec<String>,
    },

    /// Insert or replace routes by id, then drop the removed ids.
    Routes {
        #[serde(default)]
        upsert: Vec<Route>,
        #[serde(default)]
        remove: Vec<String>,
    },

    /// Live status of a single route.
    RouteStatus { route_id: String, status: String, timestamp: Option<NaiveDateTime> },

    /// Fresh figures for the area currently being analysed.
    Coverage { analysis: CoverageAnalysis },
}

impl Delta {
    /// The resource this delta applies to.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Stops { .. } => ResourceKind::Stops,
            Self::Routes { .. } | Self::RouteStatus { .. } => ResourceKind::Routes,
            Self::Coverage { .. } => ResourceKind::Coverage,
        }
    }

    /// Merge into `resource`, returning `false` when the delta does not touch
    /// it (unknown route, different area, mismatched kind).
    pub(crate) fn merge_into(self, resource: &mut Resource) -> bool {
        match (self, resource) {
            (Self::Stops { upsert, remove }, Resource::Stops(stops)) => {
                merge_by_id(stops, upsert, &remove, |stop| &stop.id);
                true
            }
            (Self::Routes { upsert, remove }, Resource::Routes(routes)) => {
                merge_by_id(routes, upsert, &remove, |route| &route.id);
                true
            }
            (Self::RouteStatus { route_id, status, timestamp }, Resource::Routes(routes)) => {
                let Some(route) = routes.iter_mut().find(|route| route.id == route_id) else {
                    return false;
                };
                route.status = Some(status);
                route.status_at = timestamp;
                true
            }
            (Self::Coverage { analysis }, Resource::Coverage(current)) => {
                if analysis.area_id != current.area_id {
                    return false;
                }
                *current = analysis;
                true
            }
            _ => false,
        }
    }
}

fn merge_by_id<T>(
    items: &mut Vec<T>, upsert: Vec<T>, remove: &[String], id: impl Fn(&T) -> &String,
) {
    for item in upsert {
        match items.iter().position(|existing| id(existing) == id(&item)) {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
    }
    if !remove.is_empty() {
        items.retain(|item| !remove.contains(id(item)));
    }
}
