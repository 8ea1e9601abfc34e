use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use leaderboard::github::MAX_CODE_SEARCH_PAGES;
use leaderboard::sync::SyncProgress;

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner for the topic search.
    tag_bar: Option<ProgressBar>,
    /// Code search bars by manifest filename.
    code_bars: HashMap<String, ProgressBar>,
    /// Bar for detail lookups.
    detail_bar: Option<ProgressBar>,
    /// Spinner for catalog persistence.
    save_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_multi(MultiProgress::new())
    }

    /// A reporter that tracks state without drawing anything.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_multi(MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()))
    }

    fn with_multi(multi: MultiProgress) -> Self {
        Self {
            multi,
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn spinner(&self, prefix: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("{:12}", prefix));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    fn bar(&self, prefix: &str, len: u64) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(Self::bar_style());
        pb.set_prefix(format!("{:12}", prefix));
        pb
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::TagSearchStarted { topic } => {
                let pb = self.spinner("Tags");
                pb.set_message(format!("Searching topic:{}...", topic));
                state.tag_bar = Some(pb);
            }

            SyncProgress::TagSearchComplete { found } => {
                if let Some(ref pb) = state.tag_bar {
                    pb.finish_with_message(format!("✓ {} tagged repos", found));
                }
            }

            SyncProgress::CodeSearchSkipped => {
                drop(state);
                self.multi
                    .println("· No GitHub token, code search skipped")
                    .ok();
            }

            SyncProgress::CodeSearchStarted { filename } => {
                let pb = self.bar(&filename, u64::from(MAX_CODE_SEARCH_PAGES));
                pb.set_message("Searching code...");
                state.code_bars.insert(filename, pb);
            }

            SyncProgress::CodeSearchPage {
                filename,
                page,
                count: _,
                total_so_far,
            } => {
                if let Some(pb) = state.code_bars.get(&filename) {
                    pb.set_position(u64::from(page));
                    pb.set_message(format!("Page {} ({} repos)", page, total_so_far));
                }
            }

            SyncProgress::CodeSearchComplete {
                filename,
                found,
                pages,
                error,
            } => {
                if let Some(pb) = state.code_bars.get(&filename) {
                    // Short crawls stop early; shrink the bar so it reads as complete.
                    if error.is_none() {
                        pb.set_length(u64::from(pages.max(1)));
                        pb.set_position(u64::from(pages.max(1)));
                    }
                    let msg = match error {
                        Some(error) => format!("✗ {} repos (partial): {}", found, error),
                        None => format!("✓ {} repos", found),
                    };
                    pb.finish_with_message(msg);
                }
            }

            SyncProgress::FetchingDetails { count } => {
                let pb = self.bar("Details", count as u64);
                pb.set_message("Fetching repository details...");
                state.detail_bar = Some(pb);
            }

            SyncProgress::DetailBatchComplete { done, total } => {
                if let Some(ref pb) = state.detail_bar {
                    pb.set_position(done as u64);
                    pb.set_message(format!("{}/{} looked up", done, total));
                }
            }

            SyncProgress::DetailFailed { full_name, error } => {
                drop(state);
                self.multi.println(format!("✗ {}: {}", full_name, error)).ok();
            }

            SyncProgress::DetailsComplete { fetched, failed } => {
                if let Some(ref pb) = state.detail_bar {
                    let msg = if failed > 0 {
                        format!("✓ {} fetched, {} failed", fetched, failed)
                    } else {
                        format!("✓ {} fetched", fetched)
                    };
                    pb.finish_with_message(msg);
                }
            }

            SyncProgress::Persisting { count } => {
                let pb = self.spinner("Saving");
                pb.set_message(format!("Saving {} entries...", count));
                state.save_bar = Some(pb);
            }

            SyncProgress::SyncComplete {
                total,
                verified,
                community,
            } => {
                if let Some(ref pb) = state.save_bar {
                    pb.finish_with_message(format!(
                        "✓ {} scripts ({} verified, {} community)",
                        total, verified, community
                    ));
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let bars = state
            .tag_bar
            .iter()
            .chain(state.code_bars.values())
            .chain(state.detail_bar.iter())
            .chain(state.save_bar.iter());
        for pb in bars {
            if !pb.is_finished() {
                pb.abandon();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
