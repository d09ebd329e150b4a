//! Backend response envelope: `{status, data, message}`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use transit_core::{Result, schema};

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    status: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// FastAPI error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Value,
}

/// Decode a success envelope and extract `data.<key>`, or the whole of `data`
/// when `key` is `None`.
pub fn decode<T: DeserializeOwned>(body: &[u8], key: Option<&str>) -> Result<T> {
    let envelope: ServiceResponse = serde_json::from_slice(body)
        .map_err(|err| schema!("response is not a service envelope: {err}"))?;

    if envelope.status != SUCCESS {
        let message = envelope.message.as_deref().unwrap_or("no message");
        return Err(schema!("unexpected status `{}`: {message}", envelope.status));
    }

    let Some(data) = envelope.data else {
        return Err(schema!("missing `data`"));
    };

    let payload = match key {
        Some(key) => {
            let Value::Object(mut fields) = data else {
                return Err(schema!("`data` is not an object"));
            };
            fields.remove(key).ok_or_else(|| schema!("missing `data.{key}`"))?
        }
        None => data,
    };

    serde_json::from_value(payload).map_err(|err| {
        let field = key.map_or_else(|| "data".to_string(), |key| format!("data.{key}"));
        schema!("invalid `{field}`: {err}")
    })
}

/// Best-effort description of an error response body.
pub fn error_detail(body: &[u8]) -> Option<String> {
    let detail = serde_json::from_slice::<ErrorDetail>(body).ok()?.detail;
    Some(match detail {
        Value::String(text) => text,
        other => other.to_string(),
    })
}
