//! Error types for the CoinGecko API client.
//!
//! # Design
//! Failures fall into three groups that callers handle differently: bad
//! options caught before any network traffic, transport failures (network,
//! timeout, non-2xx) passed through untouched, and bodies that are not JSON.
//! Construction-time configuration problems get their own variant.

use thiserror::Error;

/// Errors returned by `CoinGeckoClient` and the route/decode helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The options argument was not a mapping of option name to value.
    #[error("options should be a mapping of option name to value")]
    InvalidOptionsType,

    /// The client configuration was rejected at construction.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP layer failed or the server answered with a non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of a non-2xx reply, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(TransportError::Timeout))
    }
}

/// Failures surfaced by a `Transport` or by status checking.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No complete response arrived within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server replied with a status outside 200..=299.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, DNS, TLS or body read failure.
    #[error("network error: {0}")]
    Network(String),
}
