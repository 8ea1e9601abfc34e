//! Progress reporting for sync operations.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bars using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing
//!
//! Progress bars are organized as:
//! - Tag bar: the topic search
//! - Code search bars: one per manifest filename, one tick per page
//! - Detail bar: repository lookups for code-search-only hits
//! - Save bar: catalog persistence

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use leaderboard::sync::{ProgressCallback, SyncProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_run() -> Vec<SyncProgress> {
        vec![
            SyncProgress::TagSearchStarted {
                topic: "pinokio".to_string(),
            },
            SyncProgress::TagSearchComplete { found: 2 },
            SyncProgress::CodeSearchStarted {
                filename: "pinokio.js".to_string(),
            },
            SyncProgress::CodeSearchPage {
                filename: "pinokio.js".to_string(),
                page: 1,
                count: 2,
                total_so_far: 2,
            },
            SyncProgress::CodeSearchComplete {
                filename: "pinokio.js".to_string(),
                found: 2,
                pages: 1,
                error: None,
            },
            SyncProgress::CodeSearchStarted {
                filename: "pinokio.json".to_string(),
            },
            SyncProgress::CodeSearchComplete {
                filename: "pinokio.json".to_string(),
                found: 0,
                pages: 0,
                error: Some("Rate limited".to_string()),
            },
            SyncProgress::FetchingDetails { count: 1 },
            SyncProgress::DetailFailed {
                full_name: "someone/app".to_string(),
                error: "not found".to_string(),
            },
            SyncProgress::DetailBatchComplete { done: 1, total: 1 },
            SyncProgress::DetailsComplete {
                fetched: 0,
                failed: 1,
            },
            SyncProgress::Persisting { count: 2 },
            SyncProgress::SyncComplete {
                total: 2,
                verified: 1,
                community: 1,
            },
        ]
    }

    #[test]
    fn test_logging_reporter_handles_every_event() {
        let reporter = ProgressReporter::Logging(LoggingReporter::new());
        for event in full_run() {
            reporter.handle(event);
        }
        reporter.finish();
    }

    #[test]
    fn test_interactive_reporter_handles_every_event() {
        let reporter = ProgressReporter::Interactive(InteractiveReporter::hidden());
        for event in full_run() {
            reporter.handle(event);
        }
        reporter.finish();
    }

    #[test]
    fn test_interactive_reporter_tolerates_events_without_a_start() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::CodeSearchPage {
            filename: "pinokio.js".to_string(),
            page: 3,
            count: 100,
            total_so_far: 300,
        });
        reporter.handle(SyncProgress::DetailBatchComplete { done: 5, total: 10 });
        reporter.handle(SyncProgress::SyncComplete {
            total: 0,
            verified: 0,
            community: 0,
        });
        reporter.finish();
    }

    #[test]
    fn test_as_callback_forwards_events() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let callback = reporter.as_callback();
        callback(SyncProgress::CodeSearchSkipped);
        callback(SyncProgress::TagSearchComplete { found: 0 });
    }
}
