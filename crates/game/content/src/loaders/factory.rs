//! Content factory for building catalogs and configs from a data directory.

use std::path::{Path, PathBuf};

use combat_core::{CombatConfig, StaticCatalog};

use crate::loaders::{ConfigLoader, EffectCatalogLoader, LoadResult};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// └── effects.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `combat.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("combat.toml");
        ConfigLoader::load(&path)
    }

    /// Load the effect catalog from `effects.ron`.
    pub fn load_catalog(&self) -> LoadResult<StaticCatalog> {
        let path = self.data_dir.join("effects.ron");
        EffectCatalogLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
