//! Common re-exports for convenient entity usage.

pub use super::catalog_entry::{
    ActiveModel as CatalogEntryActiveModel, Column as CatalogEntryColumn,
    Entity as CatalogEntryEntity, Model as CatalogEntryModel,
};
pub use super::catalog_tier::CatalogTier;
