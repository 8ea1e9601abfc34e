//! Sync options, per-phase results and the sync outcome.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::github::{GitHubError, RepoMap};
use crate::retry::DEFAULT_DB_RETRIES;

/// Topic carried by tagged script repositories.
pub const DEFAULT_TOPIC: &str = "pinokio";

/// Manifest filenames that identify untagged script repositories.
pub const DEFAULT_CODE_SEARCH_FILENAMES: [&str; 2] = ["pinokio.js", "pinokio.json"];

/// Detail lookups between progress reports.
pub const DEFAULT_DETAIL_BATCH_SIZE: usize = 10;

/// Options for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Topic for the tag search.
    pub topic: String,
    /// Filenames crawled by code search, in order.
    pub code_search_filenames: Vec<String>,
    /// Detail lookups between progress reports.
    pub detail_batch_size: usize,
    /// Retries for transient database errors when persisting.
    pub db_retries: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            code_search_filenames: DEFAULT_CODE_SEARCH_FILENAMES
                .iter()
                .map(|f| f.to_string())
                .collect(),
            detail_batch_size: DEFAULT_DETAIL_BATCH_SIZE,
            db_retries: DEFAULT_DB_RETRIES,
        }
    }
}

/// Output of a phase that may partially fail.
#[derive(Debug, Default)]
pub struct PhaseResult<T> {
    /// What the phase produced, including partial results.
    pub data: T,
    /// Failures that were tolerated.
    pub errors: Vec<GitHubError>,
}

impl<T> PhaseResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// True if any failure was tolerated.
    #[inline]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// How a single code-search crawl went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSearchReport {
    pub filename: String,
    pub found: usize,
    pub pages: u32,
    pub exhausted: bool,
    pub error: Option<String>,
}

/// Result of the network phases, before anything is persisted.
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    /// Merged repositories, one per ID.
    pub repos: RepoMap,
    /// Merged repositories whose ID came from the tag search.
    pub from_tag_search: usize,
    /// Code search was not attempted (no token).
    pub code_search_skipped: bool,
    /// One report per crawled filename.
    pub code_search: Vec<CodeSearchReport>,
    /// Detail lookups that failed.
    pub detail_failures: usize,
}

impl DiscoveryResult {
    /// Merged repositories that only code search found.
    pub fn from_code_search(&self) -> usize {
        self.repos.len().saturating_sub(self.from_tag_search)
    }
}

/// Counts reported after a successful sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub verified: usize,
    pub community: usize,
    pub total: usize,
    pub from_tag_search: usize,
    pub from_code_search: usize,
    pub code_search_skipped: bool,
    /// Code-search crawls cut short by an error.
    pub code_search_failures: usize,
    pub detail_failures: usize,
}

/// Errors that abort a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync already in progress")]
    AlreadyRunning,

    #[error("tag search failed: {0}")]
    TagSearch(#[source] GitHubError),

    #[error("failed to persist catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// What a sync call returns. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncSummary),
    /// Another sync held the lock; nothing was attempted.
    Rejected { reason: String },
    Failed { reason: String },
}

impl SyncOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }

    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncOutcome::Completed(summary) => Some(summary),
            SyncOutcome::Rejected { .. } | SyncOutcome::Failed { .. } => None,
        }
    }

    pub(crate) fn failed(err: &SyncError) -> Self {
        let reason = err.to_string();
        match err {
            SyncError::AlreadyRunning => SyncOutcome::Rejected { reason },
            _ => SyncOutcome::Failed { reason },
        }
    }
}

/// JSON shape of a sync outcome: `{"success": true, ...counts}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: Option<SyncSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Completed(summary) => Self {
                success: true,
                summary: Some(summary),
                error: None,
            },
            SyncOutcome::Rejected { reason } | SyncOutcome::Failed { reason } => Self {
                success: false,
                summary: None,
                error: Some(reason),
            },
        }
    }
}
