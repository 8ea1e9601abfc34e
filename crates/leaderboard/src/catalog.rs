//! Catalog persistence: the idempotent sink and the read queries.
//!
//! Entries are keyed by GitHub repository ID. A sync upserts every entry it
//! discovered; entries that stop appearing are left in place.

mod entry;
mod errors;
mod query;
mod upsert;

pub use entry::CatalogEntry;
pub use errors::{CatalogError, Result};
pub use query::{
    CatalogStats, DEFAULT_LEADERBOARD_LIMIT, LeaderboardQuery, MAX_LEADERBOARD_LIMIT, count,
    count_by_tier, find_by_id, leaderboard, stats,
};
pub use upsert::{UPSERT_CHUNK_SIZE, upsert_entries, upsert_entries_with_retry};

pub(crate) use upsert::upsert_entries_with_config;

#[cfg(test)]
pub(crate) use entry::testing;
