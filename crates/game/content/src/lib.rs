//! Data-driven combat content and loaders.
//!
//! This crate houses the static content a combat host feeds into
//! `combat-core` and provides loaders for RON/TOML data files:
//! - Effect catalog: templates, combo rules, resistances, cleanse priority (RON)
//! - Combat configuration: balance constants (TOML)
//!
//! Content is consumed through `combat_core::EffectCatalog` and never appears
//! in session state. A default catalog and configuration ship under `data/`.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, EffectCatalogDocument, EffectCatalogLoader, LoadResult,
};
