//! Paged code-search crawler.
//!
//! GitHub caps code search at 1000 results, so at most ten pages of 100 are
//! requested. The crawl stops early on an empty or short page. A failing page
//! ends the crawl but keeps whatever was collected before it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::sync::{ProgressCallback, SyncProgress, emit};

use super::client::{GitHubClient, PAGE_SIZE};
use super::error::GitHubError;
use super::types::RepositorySummary;

/// Highest page GitHub will serve for code search at 100 per page.
pub const MAX_CODE_SEARCH_PAGES: u32 = 10;

/// Repositories keyed by GitHub ID.
pub type RepoMap = BTreeMap<i64, RepositorySummary>;

/// What a code-search crawl produced.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Parent repositories of matching files, forks excluded.
    pub repos: RepoMap,
    /// Pages that returned successfully.
    pub pages_fetched: u32,
    /// True when the crawl ended on an empty or short page.
    pub exhausted: bool,
    /// The error that cut the crawl short, if any.
    pub error: Option<GitHubError>,
}

impl CrawlOutcome {
    /// True if a page failed before the results ran out.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

impl GitHubClient {
    /// Crawl code search for files named `filename`.
    ///
    /// Never fails outright; see [`CrawlOutcome::error`].
    pub async fn crawl_code_search(
        &self,
        filename: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();

        for page in 1..=MAX_CODE_SEARCH_PAGES {
            let response = match self.search_code_page(filename, page).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        filename,
                        page,
                        collected = outcome.repos.len(),
                        error = %e,
                        "Code search page failed, keeping partial results"
                    );
                    outcome.error = Some(e);
                    return outcome;
                }
            };

            outcome.pages_fetched = page;
            let count = response.items.len();
            if count == 0 {
                outcome.exhausted = true;
                break;
            }

            for repo in response.items.into_iter().filter_map(|item| item.repository) {
                if !repo.fork {
                    outcome.repos.insert(repo.id, repo);
                }
            }

            debug!(filename, page, count, total = outcome.repos.len(), "Code search page");
            emit(
                on_progress,
                SyncProgress::CodeSearchPage {
                    filename: filename.to_string(),
                    page,
                    count,
                    total_so_far: outcome.repos.len(),
                },
            );

            if count < PAGE_SIZE as usize {
                outcome.exhausted = true;
                break;
            }
        }

        outcome
    }
}
