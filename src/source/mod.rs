//! Data-source collaborators.
//!
//! The state machines in [`crate::state`] never perform I/O. The engine runs the
//! requests they describe against these traits:
//! - [`PageSource`] answers one page request
//! - [`FacetSource`] answers one facet-count request
//!
//! [`http`] provides the reqwest-backed implementations used by the binary. Tests
//! substitute in-memory sources.

use async_trait::async_trait;

use crate::model::{Facet, FacetQuery, FetchError, PageRequest, PageResponse};

pub mod http;

pub use http::{HttpBookmarkSource, HttpFeedSource};

/// Answers page requests.
///
/// Futures run on a single-threaded `LocalSet`, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait PageSource {
    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no usable response was produced. The caller recovers
    /// locally; nothing is retried here.
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError>;
}

/// Answers facet-count requests.
#[async_trait(?Send)]
pub trait FacetSource {
    /// Fetch the options of `query.dimension` within the other filters' context.
    ///
    /// Returns the raw entries, zero counts included.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no usable response was produced.
    async fn fetch_facets(&self, query: &FacetQuery) -> Result<Vec<Facet>, FetchError>;
}
