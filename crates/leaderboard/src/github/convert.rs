//! Conversion from GitHub repositories to catalog entries.

use crate::catalog::CatalogEntry;
use crate::classify::classify_owner;

use super::types::RepositorySummary;

/// Build the catalog row for a repository, classifying its owner.
pub fn to_catalog_entry(repo: &RepositorySummary) -> CatalogEntry {
    CatalogEntry {
        id: repo.id,
        name: repo.name.clone(),
        full_name: repo.full_name.clone(),
        description: repo.description.clone().filter(|d| !d.trim().is_empty()),
        html_url: repo.html_url.clone(),
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        owner: repo.owner.login.clone(),
        owner_avatar: repo.owner.avatar_url.clone(),
        tier: classify_owner(&repo.owner.login),
        topics: repo.topics.clone(),
        updated_at: repo.updated_at,
    }
}
