//! Transit entities as returned by the backend.
//!
//! Field names follow the backend's wire format through serde renames; the
//! Rust names describe what the values are.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A transit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(rename = "stop_id", deserialize_with = "identifier")]
    pub id: String,
    #[serde(rename = "stop_name")]
    pub name: String,
    /// WGS84 latitude.
    #[serde(rename = "stop_lat")]
    pub lat: f64,
    /// WGS84 longitude.
    #[serde(rename = "stop_lon")]
    pub lon: f64,
}

/// A transit route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "route_id", deserialize_with = "identifier")]
    pub id: String,
    #[serde(rename = "route_long_name")]
    pub name: String,
    /// GTFS route type, when the backend provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_type: Option<u16>,
    /// Most recent status pushed over the live channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_at: Option<NaiveDateTime>,
}

/// An alternative way of travelling between two stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeRoute {
    #[serde(rename = "origen")]
    pub origin: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "ruta_principal")]
    pub primary_route: String,
    #[serde(rename = "ruta_alterna")]
    pub alternate_route: String,
    /// Estimated travel time in minutes.
    #[serde(rename = "tiempo_estimado")]
    pub estimated_minutes: u32,
    /// Transfer stop identifiers, in travel order.
    #[serde(rename = "transbordos", default)]
    pub transfers: Vec<String>,
}

/// Ridership and capacity figures for one census area (AGEB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    #[serde(rename = "cve_ageb", deserialize_with = "identifier")]
    pub area_id: String,
    #[serde(rename = "up_net")]
    pub boardings: i64,
    #[serde(rename = "down_net")]
    pub alightings: i64,
    #[serde(rename = "flujo")]
    pub flow: i64,
    #[serde(rename = "aforo")]
    pub capacity: f64,
    #[serde(rename = "horas_pico", default, skip_serializing_if = "Option::is_none")]
    pub peak_hours: Option<Vec<HourlyCapacity>>,
}

/// Average capacity observed during one hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyCapacity {
    #[serde(rename = "hora", deserialize_with = "identifier")]
    pub hour: String,
    #[serde(rename = "aforo")]
    pub capacity: f64,
}

/// System wide counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(rename = "total_agebs")]
    pub total_areas: u64,
    #[serde(rename = "total_paradas")]
    pub total_stops: u64,
    #[serde(rename = "total_rutas")]
    pub total_routes: u64,
    #[serde(rename = "aforo_total")]
    pub total_capacity: f64,
    #[serde(rename = "top_agebs_por_aforo", default)]
    pub top_areas: Vec<AreaCapacity>,
}

impl SystemStats {
    /// Order `top_areas` by descending average capacity, ties broken by area
    /// id ascending, keeping at most `limit` entries.
    pub fn rank_top_areas(&mut self, limit: usize) {
        self.top_areas.sort_by(|a, b| {
            b.average_capacity
                .total_cmp(&a.average_capacity)
                .then_with(|| a.area_id.cmp(&b.area_id))
        });
        self.top_areas.truncate(limit);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCapacity {
    #[serde(rename = "ageb", deserialize_with = "identifier")]
    pub area_id: String,
    #[serde(rename = "aforo_promedio")]
    pub average_capacity: f64,
}

/// Area identifiers available for coverage queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaIndex {
    #[serde(rename = "total_agebs")]
    pub total_areas: u64,
    #[serde(rename = "sample_agebs", default, deserialize_with = "identifiers")]
    pub sample_areas: Vec<String>,
}

// Identifiers are strings, but some backend sources emit them as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawIdentifier> for String {
    fn from(raw: RawIdentifier) -> Self {
        match raw {
            RawIdentifier::Text(text) => text,
            RawIdentifier::Number(number) => number.to_string(),
        }
    }
}

fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawIdentifier::deserialize(deserializer).map(String::from)
}

fn identifiers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawIdentifier>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_identifiers() {
        let stop: Stop = serde_json::from_value(json!({
            "stop_id": 42, "stop_name": "Centro", "stop_lat": 20.97, "stop_lon": -89.62
        }))
        .expect("should deserialize");
        assert_eq!(stop.id, "42");
    }

    #[test]
    fn numeric_area_identifiers() {
        let areas: AreaIndex =
            serde_json::from_value(json!({"total_agebs": 3, "sample_agebs": ["0571", 586, 1230]}))
                .expect("should deserialize");
        assert_eq!(areas.sample_areas, vec!["0571", "586", "1230"]);
    }

    #[test]
    fn route_optional_fields() {
        let route: Route =
            serde_json::from_value(json!({"route_id": "R1", "route_long_name": "Circuito"}))
                .expect("should deserialize");
        assert_eq!(route.route_type, None);
        assert_eq!(route.status, None);

        let value = serde_json::to_value(&route).expect("should serialize");
        assert_eq!(value, json!({"route_id": "R1", "route_long_name": "Circuito"}));
    }

    #[test]
    fn ranking_is_deterministic() {
        let area = |id: &str, capacity: f64| AreaCapacity {
            area_id: id.to_string(),
            average_capacity: capacity,
        };
        let mut stats = SystemStats {
            total_areas: 4,
            total_stops: 10,
            total_routes: 2,
            total_capacity: 100.0,
            top_areas: vec![area("0300", 5.0), area("0200", 9.0), area("0100", 5.0), area("0400", 1.0)],
        };

        stats.rank_top_areas(3);

        let ids: Vec<_> = stats.top_areas.iter().map(|a| a.area_id.as_str()).collect();
        assert_eq!(ids, vec!["0200", "0100", "0300"]);
    }
}
