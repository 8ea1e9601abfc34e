//! GitHub API data types.
//!
//! Only the fields the catalog needs are modelled. Code search returns a
//! reduced repository object, so counters and timestamps default when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository owner (user or organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A repository as returned by search and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Stable numeric repository ID.
    pub id: i64,
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fork: bool,
}

/// Response of `GET /search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<RepositorySummary>,
}

/// A single match from `GET /search/code`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeSearchItem {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub repository: Option<RepositorySummary>,
}

/// Response of `GET /search/code`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeSearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<CodeSearchItem>,
}
