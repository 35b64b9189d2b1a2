use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by request dispatch and raw wire exchanges.
#[derive(Debug, Error)]
pub enum WireError {
    // Request construction
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many header maps: at most one may be supplied, got {0}")]
    TooManyArguments(usize),

    // Body handling (either direction)
    #[error("Body read failed: {source}")]
    BodyRead {
        #[source]
        source: std::io::Error,
    },

    // Raw exchange
    #[error("Dial failed for {authority}: {source}")]
    Dial {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Raw request write failed: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed HTTP response: {0}")]
    ResponseParse(String),

    // Delegated exchange
    #[error("Delegate transport failed: {source}")]
    Delegate {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Client level
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    // Body decoding helpers
    #[cfg(feature = "json")]
    #[error("JSON decode failed: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl WireError {
    pub(crate) fn dial(authority: impl Into<String>, source: std::io::Error) -> Self {
        WireError::Dial {
            authority: authority.into(),
            source,
        }
    }

    pub(crate) fn body_read(source: std::io::Error) -> Self {
        WireError::BodyRead { source }
    }

    pub(crate) fn parse(detail: impl Into<String>) -> Self {
        WireError::ResponseParse(detail.into())
    }

    pub(crate) fn delegate<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        WireError::Delegate {
            source: Box::new(source),
        }
    }

    #[cfg(feature = "json")]
    pub(crate) fn decode(source: serde_json::Error) -> Self {
        WireError::Decode { source }
    }
}
