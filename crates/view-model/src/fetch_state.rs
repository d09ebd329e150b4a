use std::fmt::{self, Display};

use serde::Serialize;
use transit_core::Error;

/// Lifecycle of a single resource fetch.
///
/// `Idle -> Loading -> Success | Failure`; a refetch re-enters `Loading` from
/// either terminal state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Failure(Error),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Idle => Status::Idle,
            Self::Loading => Status::Loading,
            Self::Success(_) => Status::Success,
            Self::Failure(_) => Status::Failure,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failure(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            Self::Idle => FetchState::Idle,
            Self::Loading => FetchState::Loading,
            Self::Success(value) => FetchState::Success(f(value)),
            Self::Failure(err) => FetchState::Failure(err),
        }
    }
}

impl<T> From<transit_core::Result<T>> for FetchState<T> {
    fn from(result: transit_core::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err),
        }
    }
}

/// The tag of a [`FetchState`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Loading,
    Success,
    Failure,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn from_result() {
        let state: FetchState<u32> = Ok(7).into();
        assert_eq!(state, FetchState::Success(7));

        let state: FetchState<u32> = Err(Error::Network("refused".to_string())).into();
        assert_eq!(state.status(), Status::Failure);
        assert_eq!(state.error().map(Error::code), Some("network_error"));
    }

    #[test]
    fn serializes_tagged() {
        let value = serde_json::to_value(FetchState::Success(vec![1, 2])).expect("should serialize");
        assert_eq!(value, json!({"status": "success", "data": [1, 2]}));

        let value = serde_json::to_value(FetchState::<u8>::Loading).expect("should serialize");
        assert_eq!(value, json!({"status": "loading"}));
    }
}
