//! Leaderboard - discovery and cataloging of Pinokio scripts on GitHub.
//!
//! Scripts are found two ways: repositories tagged with the `pinokio` topic,
//! and repositories containing a `pinokio.js` or `pinokio.json` manifest
//! (code search, which needs a token). Results are merged by repository ID,
//! classified as verified or community by owner, and upserted into a
//! SQL catalog.
//!
//! # Features
//!
//! - `sqlite` (default) / `postgres` - database drivers
//! - `migrate` (default) - enables [`connect_and_migrate`] and the migrator
//! - `server` - the axum HTTP API in [`server`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leaderboard::github::GitHubClient;
//! use leaderboard::http::reqwest_transport::ReqwestTransport;
//! use leaderboard::rate_limit::ApiRateLimiter;
//! use leaderboard::sync::{Discovery, SyncOptions};
//!
//! let db = leaderboard::connect_and_migrate("sqlite://leaderboard.db?mode=rwc").await?;
//! let client = GitHubClient::new(
//!     Arc::new(ReqwestTransport::with_timeout(Duration::from_secs(30))?),
//!     std::env::var("GITHUB_TOKEN").ok(),
//!     Arc::new(ApiRateLimiter::default()),
//! );
//! let discovery = Discovery::new(client, db, SyncOptions::default());
//! let outcome = discovery.sync(None).await;
//! ```

pub mod catalog;
pub mod classify;
pub mod db;
pub mod entity;
pub mod github;
pub mod http;
pub mod rate_limit;
pub mod retry;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

#[cfg(feature = "server")]
pub mod server;

pub use catalog::{CatalogEntry, CatalogError};
pub use classify::{VERIFIED_PUBLISHERS, classify_owner, is_verified_publisher};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use github::{GitHubClient, GitHubError};
pub use rate_limit::{ApiRateLimiter, Lane, Pacer, RateLimitQuotas, Unpaced};
pub use sync::{Discovery, SyncOptions, SyncOutcome, SyncSummary};
