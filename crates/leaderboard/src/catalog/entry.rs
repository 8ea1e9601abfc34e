use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::entity::catalog_entry::{ActiveModel, Model};
use crate::entity::catalog_tier::CatalogTier;

/// A classified repository ready to be written to the catalog.
///
/// The bookkeeping timestamps (`first_seen_at`, `last_synced_at`) are owned
/// by the sink and are not part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stars: u32,
    pub forks: u32,
    pub owner: String,
    pub owner_avatar: String,
    pub tier: CatalogTier,
    pub topics: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn clamp_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl CatalogEntry {
    /// Active model for an upsert at `synced_at`.
    ///
    /// `first_seen_at` is set too, but the conflict clause never updates it,
    /// so it only takes effect on first insert.
    pub fn to_active_model(&self, synced_at: DateTime<Utc>) -> ActiveModel {
        let synced_at = synced_at.fixed_offset();
        ActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            full_name: Set(self.full_name.clone()),
            description: Set(self.description.clone()),
            html_url: Set(self.html_url.clone()),
            stars: Set(clamp_count(self.stars)),
            forks: Set(clamp_count(self.forks)),
            owner: Set(self.owner.clone()),
            owner_avatar: Set(self.owner_avatar.clone()),
            tier: Set(self.tier),
            topics: Set(serde_json::json!(self.topics)),
            updated_at: Set(self.updated_at.map(|t| t.fixed_offset())),
            first_seen_at: Set(synced_at),
            last_synced_at: Set(synced_at),
        }
    }
}

impl From<Model> for CatalogEntry {
    fn from(model: Model) -> Self {
        let topics = model.topic_list();
        Self {
            id: model.id,
            name: model.name,
            full_name: model.full_name,
            description: model.description,
            html_url: model.html_url,
            stars: u32::try_from(model.stars).unwrap_or_default(),
            forks: u32::try_from(model.forks).unwrap_or_default(),
            owner: model.owner,
            owner_avatar: model.owner_avatar,
            tier: model.tier,
            topics,
            updated_at: model.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}
