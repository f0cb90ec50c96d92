//! Content loaders for reading combat data from files.
//!
//! Every loader has a `load(path)` entry point plus a `parse(str)` variant
//! for in-memory sources; the bundled defaults are embedded at compile time.

pub mod config;
pub mod effects;
pub mod factory;

pub use config::ConfigLoader;
pub use effects::{EffectCatalogDocument, EffectCatalogLoader};
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
