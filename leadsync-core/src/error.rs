//! Error types for leadsync-core.

use thiserror::Error;

/// Failure of a single call against a remote record store.
///
/// Every variant is recoverable: callers log it and move on to the next
/// record (or the next cycle, for fetches).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The store answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The addressed record does not exist in the store.
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Configuration problems detected at startup, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or empty.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}
