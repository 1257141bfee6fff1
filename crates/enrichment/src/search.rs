//! Image search.
//!
//! [`CustomSearchClient`] talks to the Google Custom Search JSON API. Without
//! credentials it degrades to returning a manual search URL only.

use async_trait::async_trait;
use common::config::EnrichmentConfig;
use common::Error;
use launch_client::format_reqwest_error;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const MANUAL_SEARCH_URL: &str = "https://www.google.com/search";

/// One image hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCandidate {
    pub url: String,
    #[serde(default, skip_serializing)]
    pub thumbnail: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Pixel area, when both dimensions are known.
    pub size: Option<u64>,
    #[serde(rename = "isSpaceXCDN", default)]
    pub is_spacex_cdn: bool,
}

impl ImageCandidate {
    pub fn new(url: String, width: Option<u32>, height: Option<u32>) -> Self {
        let size = match (width, height) {
            (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
            _ => None,
        };
        Self {
            url,
            thumbnail: None,
            width,
            height,
            size,
            is_spacex_cdn: false,
        }
    }
}

/// Result of one search: the images (unranked) and a link a human can open.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub search_url: String,
    pub images: Vec<ImageCandidate>,
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchOutcome, Error>;

    /// Whether calls hit a remote API (and so need rate limiting).
    fn is_remote(&self) -> bool {
        true
    }
}

/// Google Images link for a query.
pub fn manual_search_url(query: &str) -> String {
    match url::Url::parse_with_params(MANUAL_SEARCH_URL, &[("tbm", "isch"), ("q", query)]) {
        Ok(url) => url.to_string(),
        Err(_) => MANUAL_SEARCH_URL.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchItem {
    link: String,
    #[serde(default)]
    image: Option<CustomSearchImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomSearchImage {
    #[serde(default)]
    thumbnail_link: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchError {
    error: CustomSearchErrorBody,
}

#[derive(Debug, Deserialize)]
struct CustomSearchErrorBody {
    message: String,
}

fn parse_items(body: CustomSearchResponse) -> Vec<ImageCandidate> {
    body.items
        .into_iter()
        .map(|item| {
            let image = item.image;
            let mut candidate = ImageCandidate::new(
                item.link,
                image.as_ref().and_then(|i| i.width),
                image.as_ref().and_then(|i| i.height),
            );
            candidate.thumbnail = image.and_then(|i| i.thumbnail_link);
            candidate
        })
        .collect()
}

/// Google Custom Search (image mode) client.
#[derive(Debug, Clone)]
pub struct CustomSearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl CustomSearchClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::ImageSearch(format!("failed to build search client: {e}")))?;

        Ok(Self {
            client,
            endpoint: CUSTOM_SEARCH_URL.to_string(),
            api_key: config.google_api_key.clone(),
            engine_id: config.search_engine_id.clone(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Both the API key and the engine id are set.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.engine_id.is_empty()
    }
}

#[async_trait]
impl ImageSearch for CustomSearchClient {
    async fn search(&self, query: &str) -> Result<SearchOutcome, Error> {
        let search_url = manual_search_url(query);

        if !self.has_credentials() {
            debug!("No search credentials, returning manual URL for {:?}", query);
            return Ok(SearchOutcome {
                search_url,
                images: Vec::new(),
            });
        }

        debug!("Image search: {}", query);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("searchType", "image"),
                ("num", "10"),
                ("imgSize", "large"),
                ("imgType", "photo"),
                ("safe", "active"),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CustomSearchError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(500).collect());
            warn!("Custom Search returned {}: {}", status, message);
            return Err(Error::ImageSearch(format!("status {status}: {message}")));
        }

        let body: CustomSearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::ImageSearch(format!("response parse error: {e}")))?;

        Ok(SearchOutcome {
            search_url,
            images: parse_items(body),
        })
    }

    fn is_remote(&self) -> bool {
        self.has_credentials()
    }
}
