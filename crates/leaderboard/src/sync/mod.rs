//! Discovery and catalog synchronization.
//!
//! # Module Structure
//!
//! - [`types`] - Options, per-phase results and the sync outcome
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - The [`Discovery`] orchestrator
//!
//! # Example
//!
//! ```ignore
//! use leaderboard::sync::{Discovery, SyncOptions, SyncOutcome};
//!
//! let discovery = Discovery::new(client, db, SyncOptions::default());
//! match discovery.sync(None).await {
//!     SyncOutcome::Completed(summary) => println!("{} scripts", summary.total),
//!     SyncOutcome::Rejected { reason } | SyncOutcome::Failed { reason } => {
//!         eprintln!("sync failed: {reason}")
//!     }
//! }
//! ```

pub mod engine;
mod progress;
mod types;

pub use engine::{Discovery, merge_phases};

pub use types::{
    CodeSearchReport, DiscoveryResult, PhaseResult, SyncError, SyncOptions, SyncOutcome,
    SyncResponse, SyncSummary,
};

pub use types::{DEFAULT_CODE_SEARCH_FILENAMES, DEFAULT_DETAIL_BATCH_SIZE, DEFAULT_TOPIC};

pub use progress::{ProgressCallback, SyncProgress, emit};
