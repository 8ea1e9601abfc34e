use leaderboard::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::TagSearchStarted { topic } => {
                tracing::info!(topic = %topic, "Searching tagged repositories");
            }

            SyncProgress::TagSearchComplete { found } => {
                tracing::info!(found, "Tag search complete");
            }

            SyncProgress::CodeSearchSkipped => {
                tracing::info!("No GitHub token configured, skipping code search");
            }

            SyncProgress::CodeSearchStarted { filename } => {
                tracing::info!(filename = %filename, "Searching code");
            }

            SyncProgress::CodeSearchPage {
                filename,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(filename = %filename, page, count, total_so_far, "Fetched page");
            }

            SyncProgress::CodeSearchComplete {
                filename,
                found,
                pages,
                error,
            } => match error {
                Some(error) => {
                    tracing::warn!(filename = %filename, found, pages, error = %error, "Code search cut short");
                }
                None => {
                    tracing::info!(filename = %filename, found, pages, "Code search complete");
                }
            },

            SyncProgress::FetchingDetails { count } => {
                tracing::info!(count, "Fetching repository details");
            }

            SyncProgress::DetailBatchComplete { done, total } => {
                tracing::debug!(done, total, "Detail batch complete");
            }

            SyncProgress::DetailFailed { full_name, error } => {
                tracing::warn!(repo = %full_name, error = %error, "Failed to fetch details");
            }

            SyncProgress::DetailsComplete { fetched, failed } => {
                tracing::info!(fetched, failed, "Detail lookups complete");
            }

            SyncProgress::Persisting { count } => {
                tracing::info!(count, "Saving catalog entries");
            }

            SyncProgress::SyncComplete {
                total,
                verified,
                community,
            } => {
                tracing::info!(total, verified, community, "Sync complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
