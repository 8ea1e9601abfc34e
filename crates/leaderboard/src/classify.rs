//! Owner-based tier classification.

use crate::entity::catalog_tier::CatalogTier;

/// Publishers whose scripts are listed as verified.
pub const VERIFIED_PUBLISHERS: [&str; 4] = [
    "cocktailpeanut",
    "pinokiofactory",
    "facefusion",
    "pinokiocomputer",
];

/// Whether `owner` is on the verified allow-list (case-insensitive).
pub fn is_verified_publisher(owner: &str) -> bool {
    VERIFIED_PUBLISHERS
        .iter()
        .any(|publisher| publisher.eq_ignore_ascii_case(owner))
}

/// Tier for a repository owned by `owner`.
pub fn classify_owner(owner: &str) -> CatalogTier {
    if is_verified_publisher(owner) {
        CatalogTier::Verified
    } else {
        CatalogTier::Community
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_listed_owners_are_verified() {
        for owner in VERIFIED_PUBLISHERS {
            assert_eq!(classify_owner(owner), CatalogTier::Verified, "{owner}");
        }
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify_owner("CocktailPeanut"), CatalogTier::Verified);
        assert_eq!(classify_owner("FACEFUSION"), CatalogTier::Verified);
    }

    #[test]
    fn everyone_else_is_community() {
        assert_eq!(classify_owner("someone"), CatalogTier::Community);
        assert_eq!(classify_owner(""), CatalogTier::Community);
        assert_eq!(classify_owner("cocktailpeanut2"), CatalogTier::Community);
        assert_eq!(classify_owner(" cocktailpeanut"), CatalogTier::Community);
    }
}
