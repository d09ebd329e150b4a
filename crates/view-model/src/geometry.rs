//! Map geometry derived from loaded resources.
//!
//! Positions are `[longitude, latitude]`, the GeoJSON axis order.

use std::collections::HashMap;

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;
use transit_api::{AlternativeRoute, Stop};

pub type Position = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopPoint {
    pub id: String,
    pub name: String,
    pub position: Position,
}

/// One alternative drawn as a line through its origin, transfers and
/// destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLine {
    pub primary_route: String,
    pub alternate_route: String,
    pub estimated_minutes: u32,
    /// Stops the line passes through, in travel order.
    pub stop_ids: Vec<String>,
    pub path: Vec<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapGeometry {
    pub stops: Vec<StopPoint>,
    pub lines: Vec<RouteLine>,
}

impl MapGeometry {
    /// Stops become points. Alternatives become lines through the stops they
    /// name; ids missing from `stops` are skipped and a line needs at least
    /// two resolved points.
    #[must_use]
    pub fn build(stops: &[Stop], alternatives: &[AlternativeRoute]) -> Self {
        let by_id: HashMap<&str, &Stop> =
            stops.iter().map(|stop| (stop.id.as_str(), stop)).collect();

        let points = stops
            .iter()
            .map(|stop| StopPoint {
                id: stop.id.clone(),
                name: stop.name.clone(),
                position: [stop.lon, stop.lat],
            })
            .collect();

        let lines = alternatives
            .iter()
            .filter_map(|alternative| {
                let waypoints = std::iter::once(&alternative.origin)
                    .chain(&alternative.transfers)
                    .chain(std::iter::once(&alternative.destination));

                let (stop_ids, path): (Vec<_>, Vec<_>) = waypoints
                    .filter_map(|id| by_id.get(id.as_str()))
                    .map(|stop| (stop.id.clone(), [stop.lon, stop.lat]))
                    .unzip();

                (path.len() >= 2).then(|| RouteLine {
                    primary_route: alternative.primary_route.clone(),
                    alternate_route: alternative.alternate_route.clone(),
                    estimated_minutes: alternative.estimated_minutes,
                    stop_ids,
                    path,
                })
            })
            .collect();

        Self { stops: points, lines }
    }

    /// GeoJSON for direct drawing: one point feature per stop and one line
    /// feature per alternative.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let points = self.stops.iter().map(|stop| {
            let mut feature = Feature::from(Geometry::new(Value::Point(stop.position.to_vec())));
            feature.set_property("kind", "stop");
            feature.set_property("id", stop.id.clone());
            feature.set_property("name", stop.name.clone());
            feature
        });

        let lines = self.lines.iter().map(|line| {
            let coordinates = line.path.iter().map(|position| position.to_vec()).collect();
            let mut feature = Feature::from(Geometry::new(Value::LineString(coordinates)));
            feature.set_property("kind", "alternative");
            feature.set_property("primary_route", line.primary_route.clone());
            feature.set_property("alternate_route", line.alternate_route.clone());
            feature.set_property("estimated_minutes", line.estimated_minutes);
            feature.set_property("stops", line.stop_ids.clone());
            feature
        });

        FeatureCollection {
            bbox: None,
            features: points.chain(lines).collect(),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop { id: id.to_string(), name: format!("Parada {id}"), lat, lon }
    }

    fn alternative(origin: &str, transfers: &[&str], destination: &str) -> AlternativeRoute {
        AlternativeRoute {
            origin: origin.to_string(),
            destination: destination.to_string(),
            primary_route: "R1".to_string(),
            alternate_route: "R2".to_string(),
            estimated_minutes: 30,
            transfers: transfers.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn lines_skip_unknown_stops() {
        let stops = [stop("A", 20.0, -89.0), stop("P1", 20.5, -89.5), stop("B", 21.0, -90.0)];
        let geometry = MapGeometry::build(&stops, &[alternative("A", &["P1", "P9"], "B")]);

        assert_eq!(geometry.stops.len(), 3);
        assert_eq!(geometry.stops[0].position, [-89.0, 20.0]);
        assert_eq!(geometry.lines.len(), 1);
        assert_eq!(geometry.lines[0].stop_ids, vec!["A", "P1", "B"]);
        assert_eq!(geometry.lines[0].path, vec![[-89.0, 20.0], [-89.5, 20.5], [-90.0, 21.0]]);
    }

    #[test]
    fn single_point_is_not_a_line() {
        let stops = [stop("A", 20.0, -89.0)];
        let geometry = MapGeometry::build(&stops, &[alternative("A", &[], "Z")]);
        assert!(geometry.lines.is_empty());
    }

    #[test]
    fn feature_collection() {
        let stops = [stop("A", 20.0, -89.0), stop("B", 21.0, -90.0)];
        let geometry = MapGeometry::build(&stops, &[alternative("A", &[], "B")]);

        let collection = geometry.to_feature_collection();

        assert_eq!(collection.features.len(), 3);
        let line = &collection.features[2];
        assert_eq!(line.property("kind").and_then(|kind| kind.as_str()), Some("alternative"));
        assert_eq!(
            line.geometry.as_ref().map(|geometry| geometry.value.clone()),
            Some(Value::LineString(vec![vec![-89.0, 20.0], vec![-90.0, 21.0]]))
        );
    }
}
