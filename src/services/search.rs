// Web Search Service
// Google Custom Search client behind the SearchProvider seam

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::CandidateMatch;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const USER_AGENT: &str = "PlagiarismChecker/1.0 (Educational Purpose)";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const MIN_QUERY_CHARS: usize = 4;
const MIN_SNIPPET_CHARS: usize = 10;
const MAX_RESULTS_CAP: usize = 10;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API quota exceeded or invalid credentials")]
    QuotaExceeded,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("API request failed with status {0}")]
    BadStatus(u16),
    #[error("Invalid response format from API")]
    InvalidResponse,
    #[error("API key not configured")]
    MissingCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub search_engine_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Minimum delay between outgoing requests.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Advisory daily request budget, reported but not enforced.
    #[serde(default = "default_daily_budget")]
    pub daily_budget: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            search_engine_id: String::new(),
            base_url: None,
            max_results: default_max_results(),
            request_delay_ms: default_request_delay_ms(),
            daily_budget: default_daily_budget(),
        }
    }
}

fn default_max_results() -> usize { 5 }
fn default_request_delay_ms() -> u64 { 1200 }
fn default_daily_budget() -> u32 { 100 }

/// Search collaborator queried once per sentence by the checker.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CandidateMatch>, SearchError>;
}

// ============ Response Payload ============

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    display_link: String,
}

// ============ Google Client ============

pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    search_engine_id: String,
    base_url: String,
    max_results: usize,
    daily_budget: u32,
    limiter: Option<DefaultDirectRateLimiter>,
    requests_made: AtomicU32,
}

impl GoogleSearchClient {
    pub fn new(config: &SearchConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        let base_url = env::var("COPYCHECK_SEARCH_URL")
            .ok()
            .or_else(|| config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // zero delay disables the limiter
        let limiter = Quota::with_period(Duration::from_millis(config.request_delay_ms))
            .map(RateLimiter::direct);

        Self {
            client,
            api_key: config.api_key.clone(),
            search_engine_id: config.search_engine_id.clone(),
            base_url,
            max_results: config.max_results,
            daily_budget: config.daily_budget,
            limiter,
            requests_made: AtomicU32::new(0),
        }
    }

    /// Exact-phrase search returning at most `max_results` candidates.
    /// Queries shorter than four characters are answered locally with an
    /// empty list, as a request for them would only burn quota.
    pub async fn search_limited(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateMatch>, SearchError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        if self.api_key.is_empty() || self.search_engine_id.is_empty() {
            return Err(SearchError::MissingCredentials);
        }

        let quoted = format!("\"{}\"", clean_query(trimmed));
        let num = max_results.min(MAX_RESULTS_CAP).to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.search_engine_id.as_str()),
            ("q", quoted.as_str()),
            ("num", num.as_str()),
            ("safe", "active"),
            ("lr", "lang_en"),
            ("gl", "us"),
            ("hl", "en"),
            ("filter", "1"),
        ];

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        self.requests_made.fetch_add(1, Ordering::Relaxed);

        match response.status().as_u16() {
            200 => {
                let body: SearchResponse = response
                    .json()
                    .await
                    .map_err(|_| SearchError::InvalidResponse)?;
                let candidates: Vec<CandidateMatch> = body
                    .items
                    .into_iter()
                    .filter_map(|item| {
                        let snippet = item.snippet.trim().to_string();
                        if snippet.chars().count() > MIN_SNIPPET_CHARS {
                            Some(CandidateMatch {
                                title: item.title.trim().to_string(),
                                url: item.link.trim().to_string(),
                                domain: item.display_link.trim().to_string(),
                                snippet,
                            })
                        } else {
                            None
                        }
                    })
                    .take(max_results)
                    .collect();
                debug!("[SEARCH] {} candidates returned", candidates.len());
                Ok(candidates)
            }
            403 => Err(SearchError::QuotaExceeded),
            429 => Err(SearchError::RateLimited),
            status => Err(SearchError::BadStatus(status)),
        }
    }

    /// One-result probe to verify credentials and connectivity.
    pub async fn test_connection(&self) -> bool {
        match self.search_limited("python programming test", 1).await {
            Ok(candidates) => !candidates.is_empty(),
            Err(e) => {
                warn!("[SEARCH] connection test failed: {}", e);
                false
            }
        }
    }

    pub fn requests_made(&self) -> u32 {
        self.requests_made.load(Ordering::Relaxed)
    }

    pub fn requests_remaining(&self) -> u32 {
        self.daily_budget.saturating_sub(self.requests_made())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
        self.search_limited(query, self.max_results).await
    }
}

fn query_charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s\-.]").unwrap())
}

fn query_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Keeps word characters, whitespace, hyphens and dots; everything else
/// becomes a space before the whitespace collapse.
pub fn clean_query(query: &str) -> String {
    let replaced = query_charset_re().replace_all(query, " ");
    query_space_re().replace_all(&replaced, " ").trim().to_string()
}
