//! Error types for the refresh engine.
//!
//! [`FetchError`] is the only error that crosses the engine boundary.  The
//! application shell (config, logging, terminal) uses [`anyhow`] instead.

use thiserror::Error;

/// Why a single endpoint fetch did not produce a usable payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, body read error, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Bytes arrived but could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// True for failures where no response body was captured.
    pub fn is_transport(&self) -> bool {
        !matches!(self, FetchError::Decode(_))
    }
}
