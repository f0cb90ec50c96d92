//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
///
/// Keys missing from the file keep their [`CombatConfig::default`] values, so
/// a file only needs to list what it retunes.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing CombatConfig
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(source: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.flee_min_chance > config.flee_max_chance {
            anyhow::bail!(
                "flee_min_chance ({}) exceeds flee_max_chance ({})",
                config.flee_min_chance,
                config.flee_max_chance
            );
        }
        Ok(config)
    }

    /// The configuration shipped in `data/combat.toml`.
    pub fn bundled() -> LoadResult<CombatConfig> {
        Self::parse(include_str!("../../data/combat.toml"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        assert_eq!(ConfigLoader::bundled().unwrap(), CombatConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "player_crit_chance = 0.25").unwrap();
        writeln!(file, "max_automatic_turns = 8").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.player_crit_chance, 0.25);
        assert_eq!(config.max_automatic_turns, 8);
        assert_eq!(config.opponent_crit_chance, CombatConfig::default().opponent_crit_chance);
    }

    #[test]
    fn inverted_flee_bounds_are_rejected() {
        let err = ConfigLoader::parse("flee_min_chance = 0.9\nflee_max_chance = 0.1").unwrap_err();
        assert!(err.to_string().contains("flee_min_chance"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ConfigLoader::parse("player_crit_chance = \"lots\"").is_err());
    }
}
