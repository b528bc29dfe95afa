//! Remote photo source.
//!
//! [`PhotoSource`] is the seam between the gallery state machine and the
//! network. [`FlickrSource`] talks to the Flickr REST API; tests substitute
//! in-memory sources.
//!
//! Both page fetches fail with [`SourceError`] instead of returning partial
//! data. Callers treat every error as non-fatal.

mod flickr;

pub use flickr::{FlickrSource, REST_ENDPOINT, default_params, search_params};

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use crate::photo::Photo;

/// Number of photos requested per search page.
pub const PAGE_SIZE: u32 = 50;

/// Errors from the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Transport failure: DNS, connect, timeout, or a non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),
    /// The body did not have the expected `photos.photo` shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// What a single page fetch asks the source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// The default feed of recent photos (single page).
    Default,
    /// One page of search results.
    Search { text: String, page: u32 },
}

/// A remote source of photo metadata and image bytes.
pub trait PhotoSource: Send + Sync + 'static {
    /// Fetch the default feed.
    fn fetch_default(&self) -> impl Future<Output = Result<Vec<Photo>, SourceError>> + Send;

    /// Fetch one page of search results. Pages start at 1.
    fn fetch_search(
        &self,
        text: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<Photo>, SourceError>> + Send;

    /// Fetch raw image bytes from a photo URL.
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}

/// Dispatch a [`PageRequest`] to the matching source method.
pub async fn fetch_page<S: PhotoSource>(
    source: &S,
    request: &PageRequest,
) -> Result<Vec<Photo>, SourceError> {
    match request {
        PageRequest::Default => source.fetch_default().await,
        PageRequest::Search { text, page } => source.fetch_search(text, *page, PAGE_SIZE).await,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    photos: Option<PhotoList>,
    stat: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoList {
    photo: Vec<Photo>,
}

/// Parse an API response body into photos.
///
/// # Errors
///
/// Returns [`SourceError::MalformedResponse`] when the body is not JSON,
/// lacks `photos.photo`, or any photo is missing a required field.
pub fn parse_photo_page(body: &[u8]) -> Result<Vec<Photo>, SourceError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|err| SourceError::MalformedResponse(err.to_string()))?;
    match envelope {
        Envelope {
            photos: Some(list), ..
        } => Ok(list.photo),
        Envelope {
            stat: Some(stat),
            message,
            ..
        } if stat == "fail" => Err(SourceError::MalformedResponse(format!(
            "api failure: {}",
            message.as_deref().unwrap_or("no message")
        ))),
        Envelope { .. } => Err(SourceError::MalformedResponse(
            "missing photos.photo".to_string(),
        )),
    }
}
