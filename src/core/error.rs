//! Failure taxonomy for rate acquisition and derivation.
//!
//! None of these are fatal. The rate manager records them in its snapshot and
//! keeps serving whatever rates it already has.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// Transport error, timeout or a non-2xx response.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Neither a cached entry nor a network result is available.
    #[error("No rate data available")]
    NoData,

    /// The anchor rate for a derived table is missing or not positive.
    #[error("Derived rates unavailable: {0}")]
    DerivationUnavailable(String),
}

impl From<reqwest::Error> for RateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RateError::MalformedResponse(e.to_string())
        } else {
            RateError::NetworkFailure(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RateError {
    fn from(e: serde_json::Error) -> Self {
        RateError::MalformedResponse(e.to_string())
    }
}
