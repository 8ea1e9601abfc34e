use std::collections::HashSet;

use backon::Retryable;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, sea_query::OnConflict};

use crate::entity::catalog_entry::{Column, Entity as CatalogEntryEntity};
use crate::retry::RetryConfig;

use super::entry::CatalogEntry;
use super::errors::{CatalogError, Result};

/// Rows per `INSERT` statement, well under SQLite's bound-parameter limit.
pub const UPSERT_CHUNK_SIZE: usize = 500;

/// Build the ON CONFLICT clause used by the upsert.
///
/// Every mutable column is replaced and `last_synced_at` advances.
/// `first_seen_at` is deliberately absent from the update set.
pub(crate) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id)
        .update_columns([
            Column::Name,
            Column::FullName,
            Column::Description,
            Column::HtmlUrl,
            Column::Stars,
            Column::Forks,
            Column::Owner,
            Column::OwnerAvatar,
            Column::Tier,
            Column::Topics,
            Column::UpdatedAt,
            Column::LastSyncedAt,
        ])
        .to_owned()
}

/// Keep only the last entry for each ID, preserving order otherwise.
fn dedupe_latest(entries: &[CatalogEntry]) -> Vec<&CatalogEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut unique: Vec<&CatalogEntry> = entries
        .iter()
        .rev()
        .filter(|entry| seen.insert(entry.id))
        .collect();
    unique.reverse();
    unique
}

/// Insert or update catalog entries keyed by repository ID.
///
/// New rows get `first_seen_at = synced_at`; existing rows keep theirs.
/// Each row's fields are replaced as one unit. Empty input is a no-op.
///
/// # Returns
/// The number of rows inserted or updated.
pub async fn upsert_entries(
    db: &DatabaseConnection,
    entries: &[CatalogEntry],
    synced_at: DateTime<Utc>,
) -> Result<u64> {
    if entries.is_empty() {
        return Ok(0);
    }

    let unique = dedupe_latest(entries);
    let mut affected = 0u64;

    for chunk in unique.chunks(UPSERT_CHUNK_SIZE) {
        let models = chunk.iter().map(|entry| entry.to_active_model(synced_at));
        affected += CatalogEntryEntity::insert_many(models)
            .on_conflict(build_upsert_on_conflict())
            .exec_without_returning(db)
            .await?;
    }

    tracing::debug!(count = unique.len(), affected, "Upserted catalog entries");
    Ok(affected)
}

/// [`upsert_entries`] with retries on transient database errors.
///
/// `max_retries = 0` disables retrying.
pub async fn upsert_entries_with_retry(
    db: &DatabaseConnection,
    entries: &[CatalogEntry],
    synced_at: DateTime<Utc>,
    max_retries: usize,
) -> Result<u64> {
    upsert_entries_with_config(db, entries, synced_at, RetryConfig::with_max_retries(max_retries))
        .await
}

pub(crate) async fn upsert_entries_with_config(
    db: &DatabaseConnection,
    entries: &[CatalogEntry],
    synced_at: DateTime<Utc>,
    config: RetryConfig,
) -> Result<u64> {
    (|| upsert_entries(db, entries, synced_at))
        .retry(config.into_backoff())
        .when(CatalogError::is_retryable)
        .notify(|err, dur| {
            tracing::warn!(
                retry_in_ms = dur.as_millis() as u64,
                error = %err,
                "Catalog upsert failed, retrying..."
            );
        })
        .await
}
