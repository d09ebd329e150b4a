//! Inbound live message parsing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use transit_core::{Result, channel_parse};
use view_model::Delta;

/// Route status frame, as broadcast by the backend and as sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStatusUpdate {
    pub route_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl From<RouteStatusUpdate> for Delta {
    fn from(update: RouteStatusUpdate) -> Self {
        Self::RouteStatus {
            route_id: update.route_id,
            status: update.status,
            timestamp: update.timestamp,
        }
    }
}

/// Parse one inbound message into a [`Delta`].
///
/// Accepts deltas tagged by `kind` and the backend's `route_update` broadcast
/// tagged by `type`.
///
/// # Errors
///
/// Returns a channel parse error for anything else.
pub fn parse_message(text: &str) -> Result<Delta> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| channel_parse!("message is not json: {err}"))?;

    if value.get("kind").is_some() {
        return serde_json::from_value(value).map_err(|err| channel_parse!("invalid delta: {err}"));
    }

    match value.get("type").and_then(Value::as_str) {
        Some("route_update") => {
            let update: RouteStatusUpdate = serde_json::from_value(value)
                .map_err(|err| channel_parse!("invalid route_update: {err}"))?;
            Ok(update.into())
        }
        Some(other) => Err(channel_parse!("unknown message type `{other}`")),
        None => Err(channel_parse!("message has neither `kind` nor `type`")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn route_update() {
        let delta = parse_message(
            r#"{"type":"route_update","route_id":"R12","status":"delayed","timestamp":"2024-05-02T08:15:30.250000"}"#,
        )
        .expect("should parse");

        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 2)
            .and_then(|date| date.and_hms_micro_opt(8, 15, 30, 250_000));
        assert_eq!(
            delta,
            Delta::RouteStatus {
                route_id: "R12".to_string(),
                status: "delayed".to_string(),
                timestamp,
            }
        );
    }

    #[test]
    fn kind_tagged() {
        let delta = parse_message(r#"{"kind":"stops","remove":["4"]}"#).expect("should parse");
        assert_eq!(delta, Delta::Stops { upsert: vec![], remove: vec!["4".to_string()] });
    }

    #[test]
    fn malformed() {
        for text in [
            "not json",
            r#"{"kind":"trains"}"#,
            r#"{"type":"route_update","status":"delayed"}"#,
            r#"{"type":"heartbeat"}"#,
            r#"[1, 2, 3]"#,
        ] {
            let err = parse_message(text).unwrap_err();
            assert_eq!(err.code(), "channel_parse_error", "{text}");
        }
    }
}
