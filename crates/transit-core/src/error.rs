//! Transit client errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the transit client crates.
pub type Result<T> = anyhow::Result<T, Error>;

/// Domain level error type surfaced as the reason of a failed fetch.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// Caller input was rejected before any network call was made.
    #[error("code: validation_error, description: {0}")]
    Validation(String),

    /// Transport failure: timeout, refused connection or a non-2xx status.
    #[error("code: network_error, description: {0}")]
    Network(String),

    /// The response body was malformed or did not have the expected shape.
    #[error("code: schema_error, description: {0}")]
    Schema(String),

    /// A live update message could not be parsed.
    #[error("code: channel_parse_error, description: {0}")]
    ChannelParse(String),
}

impl Error {
    /// Returns the stable error code associated with the variant.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Network(_) => "network_error",
            Self::Schema(_) => "schema_error",
            Self::ChannelParse(_) => "channel_parse_error",
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Whether retrying the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");

        // if type is Error, return it with the newly added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("Error: {err}, caused by: {inner}");

            return match inner {
                Self::Validation(_) => Self::Validation(chain),
                Self::Network(_) => Self::Network(chain),
                Self::Schema(_) => Self::Schema(chain),
                Self::ChannelParse(_) => Self::ChannelParse(chain),
            };
        }

        // untyped errors originate in the host transport
        Self::Network(chain)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

#[macro_export]
macro_rules! validation {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Validation(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::Validation(format!($err))
    };
}

#[macro_export]
macro_rules! network {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Network(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::Network(format!($err))
    };
}

#[macro_export]
macro_rules! schema {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Schema(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::Schema(format!($err))
    };
}

#[macro_export]
macro_rules! channel_parse {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ChannelParse(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::ChannelParse(format!($err))
    };
}
