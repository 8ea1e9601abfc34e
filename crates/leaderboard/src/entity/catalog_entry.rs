//! CatalogEntry entity - one discovered script repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::catalog_tier::CatalogTier;

/// A script repository as stored in the catalog, keyed by GitHub ID.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_entries")]
pub struct Model {
    /// GitHub repository ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub html_url: String,

    pub stars: i32,
    pub forks: i32,

    pub owner: String,
    #[sea_orm(column_type = "Text")]
    pub owner_avatar: String,

    pub tier: CatalogTier,
    /// Topics as a JSON array of strings.
    #[sea_orm(column_type = "Json")]
    pub topics: serde_json::Value,

    /// Last update on GitHub.
    pub updated_at: Option<DateTimeWithTimeZone>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// Set on first insert and never changed.
    pub first_seen_at: DateTimeWithTimeZone,
    /// Time of the most recent sync that saw this repository.
    pub last_synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Topics decoded from the JSON column; malformed values yield nothing.
    pub fn topic_list(&self) -> Vec<String> {
        self.topics
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
