use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};
use serde::Serialize;

use crate::entity::catalog_entry::{Column, Entity as CatalogEntryEntity, Model};
use crate::entity::catalog_tier::CatalogTier;

use super::errors::{CatalogError, Result};

/// Default number of rows returned by [`leaderboard`].
pub const DEFAULT_LEADERBOARD_LIMIT: u64 = 50;

/// Upper bound on rows returned by [`leaderboard`].
pub const MAX_LEADERBOARD_LIMIT: u64 = 1000;

/// Filters for the ranked listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    /// Restrict to one tier.
    pub tier: Option<CatalogTier>,
    /// Case-insensitive substring matched against name, description and owner.
    pub search: Option<String>,
    /// Maximum rows, `1..=MAX_LEADERBOARD_LIMIT`.
    pub limit: u64,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            tier: None,
            search: None,
            limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

/// Aggregate numbers over the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: u64,
    pub verified: u64,
    pub community: u64,
    pub total_stars: i64,
    /// Most recent `last_synced_at` across all entries.
    pub last_synced_at: Option<DateTime<Utc>>,
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    [Column::Name, Column::Description, Column::Owner]
        .into_iter()
        .fold(Condition::any(), |cond, column| {
            cond.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
        })
}

// ─── Query Operations ────────────────────────────────────────────────────────

/// Catalog entries ranked by stars, most-starred first.
///
/// # Errors
/// Returns `CatalogError::InvalidInput` if `limit` is zero or above
/// [`MAX_LEADERBOARD_LIMIT`].
pub async fn leaderboard(db: &DatabaseConnection, query: &LeaderboardQuery) -> Result<Vec<Model>> {
    if query.limit == 0 || query.limit > MAX_LEADERBOARD_LIMIT {
        return Err(CatalogError::invalid_input(format!(
            "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}, got {}",
            query.limit
        )));
    }

    let mut select = CatalogEntryEntity::find();

    if let Some(tier) = query.tier {
        select = select.filter(Column::Tier.eq(tier));
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(search_condition(term));
    }

    let rows = select
        .order_by_desc(Column::Stars)
        .order_by_asc(Column::Id)
        .limit(query.limit)
        .all(db)
        .await?;
    Ok(rows)
}

/// Counts, total stars and the last sync time.
pub async fn stats(db: &DatabaseConnection) -> Result<CatalogStats> {
    let total = count(db).await?;
    let verified = count_by_tier(db, CatalogTier::Verified).await?;
    let community = count_by_tier(db, CatalogTier::Community).await?;

    let total_stars: Option<i64> = CatalogEntryEntity::find()
        .select_only()
        .column_as(Column::Stars.sum(), "total_stars")
        .into_tuple()
        .one(db)
        .await?
        .flatten();

    let last_synced_at = CatalogEntryEntity::find()
        .order_by_desc(Column::LastSyncedAt)
        .one(db)
        .await?
        .map(|m| m.last_synced_at.with_timezone(&Utc));

    Ok(CatalogStats {
        total,
        verified,
        community,
        total_stars: total_stars.unwrap_or(0),
        last_synced_at,
    })
}

/// Count all catalog entries.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    Ok(CatalogEntryEntity::find().count(db).await?)
}

/// Count entries in one tier.
pub async fn count_by_tier(db: &DatabaseConnection, tier: CatalogTier) -> Result<u64> {
    Ok(CatalogEntryEntity::find()
        .filter(Column::Tier.eq(tier))
        .count(db)
        .await?)
}

/// Find an entry by repository ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Model>> {
    Ok(CatalogEntryEntity::find_by_id(id).one(db).await?)
}
