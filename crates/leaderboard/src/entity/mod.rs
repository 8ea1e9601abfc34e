//! SeaORM entity definitions for the leaderboard database schema.

pub mod catalog_entry;
pub mod catalog_tier;
pub mod prelude;
