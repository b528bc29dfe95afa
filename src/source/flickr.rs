use std::time::Duration;

use reqwest::Client;

use super::{PhotoSource, SourceError, parse_photo_page};
use crate::photo::Photo;

/// Flickr REST endpoint.
pub const REST_ENDPOINT: &str = "https://www.flickr.com/services/rest/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

type Params = Vec<(&'static str, String)>;

/// Query parameters shared by every REST call.
fn base_params(method: &str, api_key: &str) -> Params {
    vec![
        ("method", method.to_string()),
        ("api_key", api_key.to_string()),
        ("format", "json".to_string()),
        ("nojsoncallback", "1".to_string()),
        ("safe_search", "1".to_string()),
    ]
}

/// Parameters for the recent-photos feed.
pub fn default_params(api_key: &str) -> Params {
    base_params("flickr.photos.getRecent", api_key)
}

/// Parameters for one page of a relevance-sorted text search.
pub fn search_params(api_key: &str, text: &str, page: u32, page_size: u32) -> Params {
    let mut params = base_params("flickr.photos.search", api_key);
    params.extend([
        ("text", text.to_string()),
        ("per_page", page_size.to_string()),
        ("page", page.to_string()),
        ("sort", "relevance".to_string()),
    ]);
    params
}

/// [`PhotoSource`] backed by the Flickr REST API.
#[derive(Debug, Clone)]
pub struct FlickrSource {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl FlickrSource {
    /// Create a source using `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Network`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(api_key: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("photogrid/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: REST_ENDPOINT.to_string(),
        })
    }

    /// Point the source at a different REST endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn get_photos(&self, params: Params) -> Result<Vec<Photo>, SourceError> {
        let method = params
            .first()
            .map_or("<unknown>", |(_, value)| value.as_str())
            .to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let photos = parse_photo_page(&body)?;
        tracing::debug!(%method, count = photos.len(), "fetched photo page");
        Ok(photos)
    }
}

impl PhotoSource for FlickrSource {
    async fn fetch_default(&self) -> Result<Vec<Photo>, SourceError> {
        self.get_photos(default_params(&self.api_key)).await
    }

    async fn fetch_search(
        &self,
        text: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Photo>, SourceError> {
        self.get_photos(search_params(&self.api_key, text, page, page_size))
            .await
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
