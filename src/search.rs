use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::config::SearchSettings;

pub const MOCK_CONTENT: &str =
    "This is mock content. Configure a search API key for real search results.";
pub const MOCK_SCORE: f64 = 0.8;

/// Web-search service: a query in, a ranked list of hits out.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

pub type DynSearchClient = dyn SearchClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDepth::Basic => write!(f, "basic"),
            SearchDepth::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub depth: SearchDepth,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Missing and `null` fields both read as their default, so one sparse hit
/// never fails the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default)]
    pub published_date: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Placeholder hit used when no search backend is configured.
///
/// The URL carries `iteration` so results from successive search passes stay
/// distinguishable.
pub fn mock_hit(query: &str, iteration: u32) -> SearchHit {
    SearchHit {
        title: format!("Mock Result for: {query}"),
        url: format!("https://example.com/mock-{iteration}"),
        content: MOCK_CONTENT.to_string(),
        score: MOCK_SCORE,
        published_date: None,
    }
}

/// Client for the Tavily search API.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TavilyClient {
    /// Returns `None` when no API key is configured.
    pub fn from_settings(settings: &SearchSettings) -> Result<Option<Self>> {
        let Some(api_key) = settings.api_key.clone() else {
            return Ok(None);
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Some(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
        }))
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let body = TavilyRequest {
            query: &request.query,
            max_results: request.max_results,
            search_depth: request.depth,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        };
        debug!(query = %request.query, depth = %request.depth, "sending search request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to search endpoint")?;

        match response.status() {
            StatusCode::OK => response
                .json::<SearchResponse>()
                .await
                .context("Failed to parse search response JSON"),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(anyhow!(
                "Invalid search API key. Please check TAVILY_API_KEY."
            )),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(anyhow!("Search rate limit exceeded. Please try again later."))
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow!("Search API error (status {}): {}", status, error_text))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: SearchDepth,
    include_domains: Vec<String>,
    exclude_domains: Vec<String>,
}
