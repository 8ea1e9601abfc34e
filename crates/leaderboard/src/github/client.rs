//! Rate-limited GitHub fetcher and the single-request endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http::{HttpRequest, HttpTransport};
use crate::rate_limit::{Lane, Pacer};

use super::error::{GitHubError, is_rate_limit_status};
use super::types::{CodeSearchResponse, RepoSearchResponse, RepositorySummary};

/// Default GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Results per page for every search request.
pub const PAGE_SIZE: u32 = 100;

const USER_AGENT: &str = concat!("leaderboard/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const RATE_LIMIT_FALLBACK_MESSAGE: &str = "Rate limited";

/// A decoded JSON response that was not rate limited.
///
/// Non-success statuses are kept so callers can decide how to treat them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub status: u16,
    pub body: Value,
}

impl ParsedResponse {
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` field GitHub puts in error bodies.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Decode the body as `T`, turning non-success statuses into
    /// [`GitHubError::Api`].
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, GitHubError> {
        if !self.is_success() {
            let message = self
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", self.status));
            return Err(GitHubError::Api {
                status: self.status,
                message,
            });
        }

        let status = self.status;
        serde_json::from_value(self.body).map_err(|e| {
            GitHubError::Transport(format!("unexpected response shape (HTTP {status}): {e}"))
        })
    }
}

/// GitHub client shared by every discovery phase.
///
/// Cloning is cheap; the transport and pacer are shared.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    token: Option<Arc<str>>,
    pacer: Arc<dyn Pacer>,
    api_base: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client. A blank token is treated as no token.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        token: Option<String>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Arc::from);

        Self {
            transport,
            token,
            pacer,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at another API base (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether requests are authenticated. Code search requires it.
    #[inline]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn search_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("{}{}?{}", self.api_base, path, query)
    }

    /// Repository search for a topic, most-starred first.
    pub fn topic_search_url(&self, topic: &str) -> String {
        let q = format!("topic:{topic}");
        let per_page = PAGE_SIZE.to_string();
        self.search_url(
            "/search/repositories",
            &[
                ("q", q.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ],
        )
    }

    /// One page of code search for a filename.
    pub fn code_search_url(&self, filename: &str, page: u32) -> String {
        let q = format!("filename:{filename}");
        let per_page = PAGE_SIZE.to_string();
        let page = page.to_string();
        self.search_url(
            "/search/code",
            &[
                ("q", q.as_str()),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ],
        )
    }

    /// Repository detail for `owner/name`.
    pub fn repo_url(&self, full_name: &str) -> String {
        format!("{}/repos/{}", self.api_base, full_name)
    }

    /// Issue a paced GET and decode the body as JSON.
    ///
    /// HTTP 403 and 429 fail with [`GitHubError::RateLimited`] carrying the
    /// body's `message`. Every other status is returned as-is.
    pub async fn fetch_json(&self, url: &str, lane: Lane) -> Result<ParsedResponse, GitHubError> {
        self.pacer.acquire(lane).await;

        let mut request = HttpRequest::get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = self.transport.send(request).await?;
        debug!(
            url,
            status = response.status,
            remaining = ?response.header("x-ratelimit-remaining"),
            "GitHub response"
        );

        let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
            GitHubError::Transport(format!(
                "invalid JSON body (HTTP {}): {e}",
                response.status
            ))
        })?;

        if is_rate_limit_status(response.status) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(RATE_LIMIT_FALLBACK_MESSAGE)
                .to_string();
            warn!(url, status = response.status, %message, "GitHub rate limit hit");
            return Err(GitHubError::RateLimited(message));
        }

        Ok(ParsedResponse {
            status: response.status,
            body,
        })
    }

    /// Repositories tagged with `topic`, forks excluded.
    ///
    /// Only the first page (up to 100 repositories) is requested.
    pub async fn search_by_topic(&self, topic: &str) -> Result<Vec<RepositorySummary>, GitHubError> {
        let url = self.topic_search_url(topic);
        let response: RepoSearchResponse = self.fetch_json(&url, Lane::Search).await?.decode()?;

        debug!(
            topic,
            total_count = response.total_count,
            returned = response.items.len(),
            "Topic search complete"
        );

        Ok(response.items.into_iter().filter(|r| !r.fork).collect())
    }

    /// Fetch a single page of code search results.
    pub async fn search_code_page(
        &self,
        filename: &str,
        page: u32,
    ) -> Result<CodeSearchResponse, GitHubError> {
        let url = self.code_search_url(filename, page);
        self.fetch_json(&url, Lane::CodeSearch).await?.decode()
    }

    /// Full metadata for one repository.
    ///
    /// Every failure is reported as [`GitHubError::DetailNotFound`] so the
    /// caller can skip the repository and keep going.
    pub async fn get_repo(&self, full_name: &str) -> Result<RepositorySummary, GitHubError> {
        let url = self.repo_url(full_name);
        let result = match self.fetch_json(&url, Lane::Search).await {
            Ok(parsed) => parsed.decode::<RepositorySummary>(),
            Err(e) => Err(e),
        };

        result.map_err(|e| GitHubError::DetailNotFound {
            full_name: full_name.to_string(),
            reason: e.to_string(),
        })
    }
}
