//! Effect catalog loader.

use std::path::Path;

use combat_core::{ComboRule, EffectId, EffectTemplate, ResistanceRule, StaticCatalog};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Effect catalog structure for RON files.
///
/// ```text
/// (
///     templates: [ (id: "wet", name: "Wet", category: debuff, duration: Turns(3)), ... ],
///     combos: [ (name: "Electrocution", requires: ["wet", "shock"], result: "paralyzed") ],
///     resistances: [ (effect: "burning", countered_by: "wet") ],
///     cleanse_priority: ["paralyzed", "cursed", ...],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectCatalogDocument {
    pub templates: Vec<EffectTemplate>,
    pub combos: Vec<ComboRule>,
    pub resistances: Vec<ResistanceRule>,
    pub cleanse_priority: Vec<EffectId>,
}

impl EffectCatalogDocument {
    /// Validates the document and turns it into a catalog.
    pub fn into_catalog(self) -> LoadResult<StaticCatalog> {
        StaticCatalog::from_parts(
            self.templates,
            self.combos,
            self.resistances,
            self.cleanse_priority,
        )
        .map_err(|e| anyhow::anyhow!("Invalid effect catalog: {}", e))
    }
}

/// Loader for the effect catalog from RON files.
pub struct EffectCatalogLoader;

impl EffectCatalogLoader {
    /// Load and validate an effect catalog from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing an [`EffectCatalogDocument`]
    pub fn load(path: &Path) -> LoadResult<StaticCatalog> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), templates = catalog.len(), "effect catalog loaded");
        Ok(catalog)
    }

    /// Parse and validate an effect catalog from RON text.
    pub fn parse(source: &str) -> LoadResult<StaticCatalog> {
        let document: EffectCatalogDocument = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;
        document.into_catalog()
    }

    /// The catalog shipped in `data/effects.ron`.
    pub fn bundled() -> LoadResult<StaticCatalog> {
        Self::parse(include_str!("../../data/effects.ron"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use combat_core::{
        ApplyAction, ApplyOverrides, ApplyRejection, CleanseOptions, EffectCatalog, EffectTrack,
        TickContext,
    };

    use super::*;

    fn bundled_track() -> EffectTrack {
        let catalog = EffectCatalogLoader::bundled().expect("bundled catalog loads");
        EffectTrack::new(Arc::new(catalog))
    }

    #[test]
    fn bundled_catalog_is_consistent() {
        let catalog = EffectCatalogLoader::bundled().expect("bundled catalog loads");
        assert!(catalog.validate().is_ok());
        for id in ["wet", "shock", "paralyzed", "burning", "cursed", "divine_blessing"] {
            assert!(catalog.template(id).is_some(), "missing {id}");
        }
        assert!(!catalog.combo_rules().is_empty());
        assert!(!catalog.cleanse_priority().is_empty());
    }

    #[test]
    fn wet_and_shock_become_paralyzed() {
        let mut track = bundled_track();
        track.apply("wet", ApplyOverrides::none()).unwrap();
        let outcome = track.apply("shock", ApplyOverrides::none()).unwrap();

        let combo = outcome.combo.expect("combo fires");
        assert_eq!(combo.result, "paralyzed");
        assert_eq!(combo.applied, Ok(ApplyAction::Added));
        assert!(track.has_effect("paralyzed"));
        assert!(!track.has_effect("wet"));
        assert!(!track.has_effect("shock"));
        assert!(track.is_incapacitated());
    }

    #[test]
    fn blessing_blocks_curses() {
        let mut track = bundled_track();
        track.apply("divine_blessing", ApplyOverrides::none()).unwrap();

        let err = track.apply("cursed", ApplyOverrides::none()).unwrap_err();
        assert!(matches!(err, ApplyRejection::Immune { .. }));
        assert!(!track.has_effect("cursed"));
    }

    #[test]
    fn water_counters_fire_but_not_the_reverse() {
        let mut track = bundled_track();
        track.apply("wet", ApplyOverrides::none()).unwrap();
        let err = track.apply("burning", ApplyOverrides::none()).unwrap_err();
        assert!(matches!(err, ApplyRejection::Countered { .. }));

        let mut track = bundled_track();
        track.apply("burning", ApplyOverrides::none()).unwrap();
        assert!(track.apply("wet", ApplyOverrides::none()).is_ok());
    }

    #[test]
    fn cleanse_follows_catalog_priority() {
        let mut track = bundled_track();
        for id in ["wet", "bleed", "weakened", "cursed"] {
            track.apply(id, ApplyOverrides::none()).unwrap();
        }

        let removed = track.cleanse(CleanseOptions::count(2)).unwrap();
        assert_eq!(removed, vec![EffectId::new("cursed"), EffectId::new("bleed")]);
        assert!(track.has_effect("wet"));
        assert!(track.has_effect("weakened"));
    }

    #[test]
    fn soulbound_resists_removal_but_expires() {
        let mut track = bundled_track();
        track.apply("soulbound", ApplyOverrides::none()).unwrap();

        assert!(track.cleanse(CleanseOptions::count(5)).unwrap().is_empty());
        assert!(track.remove_effect("soulbound").is_err());

        let mut expired = Vec::new();
        for _ in 0..5 {
            expired.extend(track.tick(TickContext { max_hp: 100 }).expired);
        }
        assert_eq!(expired, vec![EffectId::new("soulbound")]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                templates: [
                    (id: "wet", name: "Wet", category: debuff, duration: Turns(2)),
                    (
                        id: "regen",
                        name: "Regeneration",
                        category: buff,
                        stackable: true,
                        max_stacks: 3,
                        duration: Turns(4),
                        payload: (heal_per_turn: 3),
                    ),
                ],
            )"#
        )
        .unwrap();

        let catalog = EffectCatalogLoader::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        let regen = catalog.template("regen").unwrap();
        assert_eq!(regen.max_stacks, 3);
        assert_eq!(regen.payload.heal_per_turn, 3);
    }

    #[test]
    fn rules_referring_to_unknown_effects_are_rejected() {
        let source = r#"(
            templates: [(id: "wet", name: "Wet", category: debuff, duration: Turns(2))],
            resistances: [(effect: "burning", countered_by: "wet")],
        )"#;
        let err = EffectCatalogLoader::parse(source).unwrap_err();
        assert!(err.to_string().contains("burning"), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = EffectCatalogLoader::load(Path::new("/nonexistent/effects.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
