//! HTTP data sources backed by `reqwest`.
//!
//! Endpoints:
//! - `GET /api/v1/posts` - feed pages
//! - `GET /api/v1/filters/{categories|blogs|tags}` - facet counts
//! - `GET /api/v1/posts/bookmarks` - bookmarked posts
//!
//! Parameters with no value are never sent. Array parameters are sent as one
//! `name[]=value` pair per element.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{FacetSource, PageSource};
use crate::model::{
    Facet, FacetQuery, FacetResponse, FetchError, FilterSnapshot, PageRequest, PageResponse,
};

const POSTS_PATH: [&str; 3] = ["api", "v1", "posts"];
const FILTERS_PATH: [&str; 3] = ["api", "v1", "filters"];

// ===== Parameters =====

/// Query parameters for a feed page request.
pub fn page_params(request: &PageRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), request.page.to_string()),
        ("page_size".to_string(), request.page_size.to_string()),
    ];
    push_filters(&mut params, &request.filters);
    params
}

fn push_filters(params: &mut Vec<(String, String)>, filters: &FilterSnapshot) {
    push_scalar(params, "categories", Some(filters.category.as_str()));
    push_scalar(params, "blog_id", Some(filters.blog.as_str()));
    push_array(params, "tags", &filters.tags);
}

/// Query parameters for a facet request; the queried dimension is already absent.
///
/// Facet endpoints take the category context as a one-element array
/// (`categories[]=Backend`), unlike the posts endpoint.
pub fn facet_params(query: &FacetQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(category) = &query.category {
        push_array(&mut params, "categories", std::slice::from_ref(category));
    }
    push_scalar(&mut params, "blog_id", query.blog.as_deref());
    if let Some(tags) = &query.tags {
        push_array(&mut params, "tags", tags);
    }
    params
}

fn push_scalar(params: &mut Vec<(String, String)>, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((name.to_string(), value.to_string()));
    }
}

fn push_array(params: &mut Vec<(String, String)>, name: &str, values: &[String]) {
    let key = format!("{name}[]");
    params.extend(
        values
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| (key.clone(), v.clone())),
    );
}

// ===== URLs =====

/// Append `segments` to the path of `base` and attach `params`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` cannot carry a path (e.g. `mailto:`).
pub fn endpoint_url(
    base: &Url,
    segments: &[&str],
    params: &[(String, String)],
) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    url.set_query(None);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: Url,
    bearer_token: Option<&str>,
) -> Result<T, FetchError> {
    debug!(url = %url, "http.get");
    let mut request = client.get(url);
    if let Some(token) = bearer_token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?.error_for_status()?;
    Ok(response.json::<T>().await?)
}

// ===== HttpFeedSource =====

/// Feed pages and facet counts over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    base: Url,
}

impl HttpFeedSource {
    /// Source rooted at `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for an unparsable base and
    /// [`FetchError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: Url::parse(base_url)?,
        })
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[async_trait(?Send)]
impl PageSource for HttpFeedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        let url = endpoint_url(&self.base, &POSTS_PATH, &page_params(request))?;
        get_json(&self.client, url, None).await
    }
}

#[async_trait(?Send)]
impl FacetSource for HttpFeedSource {
    async fn fetch_facets(&self, query: &FacetQuery) -> Result<Vec<Facet>, FetchError> {
        let mut segments = FILTERS_PATH.to_vec();
        segments.push(query.dimension.endpoint());
        let url = endpoint_url(&self.base, &segments, &facet_params(query))?;
        let response: FacetResponse = get_json(&self.client, url, None).await?;
        Ok(response.items)
    }
}

// ===== HttpBookmarkSource =====

/// The signed-in user's bookmarked posts.
///
/// Filters on the request are ignored; only `page` and `page_size` are sent.
#[derive(Debug, Clone)]
pub struct HttpBookmarkSource {
    client: Client,
    base: Url,
    bearer_token: Option<String>,
}

impl HttpBookmarkSource {
    /// Source rooted at `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Same as [`HttpFeedSource::new`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeout)?,
            base: Url::parse(base_url)?,
            bearer_token: None,
        })
    }

    /// Authenticate requests with a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait(?Send)]
impl PageSource for HttpBookmarkSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        let params = vec![
            ("page".to_string(), request.page.to_string()),
            ("page_size".to_string(), request.page_size.to_string()),
        ];
        let mut segments = POSTS_PATH.to_vec();
        segments.push("bookmarks");
        let url = endpoint_url(&self.base, &segments, &params)?;
        get_json(&self.client, url, self.bearer_token.as_deref()).await
    }
}
