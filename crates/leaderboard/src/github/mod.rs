//! GitHub discovery client.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response shapes for search and repository endpoints
//! - [`client`] - Paced fetcher, topic search and repository detail
//! - [`code_search`] - Multi-page code-search crawler
//! - [`convert`] - Conversion to catalog entries
//!
//! ```ignore
//! use std::sync::Arc;
//! use leaderboard::github::GitHubClient;
//! use leaderboard::http::reqwest_transport::ReqwestTransport;
//! use leaderboard::rate_limit::ApiRateLimiter;
//!
//! let client = GitHubClient::new(
//!     Arc::new(ReqwestTransport::new(reqwest::Client::new())),
//!     Some(token),
//!     Arc::new(ApiRateLimiter::default()),
//! );
//! let tagged = client.search_by_topic("pinokio").await?;
//! ```

mod client;
mod code_search;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_API_BASE, GitHubClient, PAGE_SIZE, ParsedResponse};
pub use code_search::{CrawlOutcome, MAX_CODE_SEARCH_PAGES, RepoMap};
pub use convert::to_catalog_entry;
pub use error::{GitHubError, is_rate_limit_status};
pub use types::{
    CodeSearchItem, CodeSearchResponse, RepoSearchResponse, RepositoryOwner, RepositorySummary,
};
