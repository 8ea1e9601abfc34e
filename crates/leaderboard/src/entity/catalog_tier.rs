//! Publisher tier of a catalog entry.

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a script comes from an allow-listed publisher.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum CatalogTier {
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "community")]
    #[default]
    Community,
}

impl CatalogTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogTier::Verified => "verified",
            CatalogTier::Community => "community",
        }
    }
}

impl std::fmt::Display for CatalogTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Ok(CatalogTier::Verified),
            "community" => Ok(CatalogTier::Community),
            other => Err(format!(
                "unknown tier '{other}' (expected 'verified' or 'community')"
            )),
        }
    }
}
