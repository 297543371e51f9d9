//! Error types for the list state engine.
//!
//! This module defines the error taxonomy using `thiserror`. None of these errors crash the
//! engine: every failure is recovered at the layer that observes it.
//!
//! # Error Hierarchy
//!
//! - [`CodecError`] - a raw query value the bound codec cannot parse
//! - [`FetchError`] - a page or facet request that did not produce a usable response
//!
//! Two outcomes are deliberately *not* errors:
//!
//! - A stale response (its fetch generation was superseded by a filter change) is reported
//!   as `ResolveOutcome::Stale` and dropped silently.
//! - Exhaustion (a short page) is a terminal list phase, not a failure.
//!
//! # Recovery Strategy
//!
//! - **Codec**: the store logs at debug level and falls back to the binding's default.
//! - **Page fetch**: logged, loading cleared, `has_more` untouched so the next scroll
//!   retries the same page.
//! - **Facet fetch**: logged, that facet's options degrade to an empty list.

use thiserror::Error;

/// A query-string value could not be decoded by its codec.
///
/// This indicates either a hand-edited URL or a codec that violates the round-trip law.
/// The latter is a defect caught by the property tests; at runtime the binding falls back
/// to its declared default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Raw value is not valid for the target type.
    #[error("Cannot parse {raw:?} as {expected}")]
    Invalid {
        /// The raw query-string value.
        raw: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },
}

/// A page or facet request failed.
///
/// All variants are recovered locally. The list keeps its items and its `has_more` flag,
/// so the next scroll trigger naturally retries the same page. There is no automatic
/// retry or backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Server returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The configured endpoint could not be turned into a request URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}
