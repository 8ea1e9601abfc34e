//! Progress reporting types for discovery and sync.

/// Progress events emitted while a sync runs.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Tag search is starting.
    TagSearchStarted {
        /// The topic being searched.
        topic: String,
    },

    /// Tag search returned.
    TagSearchComplete {
        /// Non-fork repositories carrying the topic.
        found: usize,
    },

    /// No token is configured, so code search is not attempted.
    CodeSearchSkipped,

    /// Starting a code-search crawl.
    CodeSearchStarted {
        /// The filename being searched.
        filename: String,
    },

    /// Fetched a page of code search results.
    CodeSearchPage {
        /// The filename being searched.
        filename: String,
        /// Page number (1-indexed).
        page: u32,
        /// Items on this page.
        count: usize,
        /// Distinct repositories collected so far for this filename.
        total_so_far: usize,
    },

    /// A code-search crawl ended.
    CodeSearchComplete {
        /// The filename that was searched.
        filename: String,
        /// Distinct repositories found.
        found: usize,
        /// Pages fetched successfully.
        pages: u32,
        /// Error message if a page failed and results are partial.
        error: Option<String>,
    },

    /// Starting detail lookups for repositories found only by code search.
    FetchingDetails {
        /// Number of lookups to perform.
        count: usize,
    },

    /// A batch of detail lookups finished.
    DetailBatchComplete {
        /// Lookups attempted so far.
        done: usize,
        /// Total lookups planned.
        total: usize,
    },

    /// A single detail lookup failed and was skipped.
    DetailFailed {
        /// `owner/name` of the repository.
        full_name: String,
        /// Error message.
        error: String,
    },

    /// Detail lookups finished.
    DetailsComplete {
        /// Repositories fetched.
        fetched: usize,
        /// Lookups that failed.
        failed: usize,
    },

    /// Writing merged entries to the catalog.
    Persisting {
        /// Number of entries being written.
        count: usize,
    },

    /// Sync finished successfully.
    SyncComplete {
        /// Total entries written.
        total: usize,
        /// Verified entries.
        verified: usize,
        /// Community entries.
        community: usize,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_calls_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), SyncProgress::TagSearchComplete { found: 3 });
        emit(Some(&callback), SyncProgress::CodeSearchSkipped);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(None, SyncProgress::Persisting { count: 10 });
    }

    #[test]
    fn events_debug_format_includes_fields() {
        let event = SyncProgress::DetailFailed {
            full_name: "someone/app".to_string(),
            error: "Not Found".to_string(),
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("DetailFailed"));
        assert!(debug_str.contains("someone/app"));
    }
}
