//! Effect catalog oracle.
//!
//! The catalog is the read-only rulebook of the effect system: templates,
//! combo rules, resistance rules and the cleanse priority list. It is loaded
//! once, shared between every track and session through an `Arc`, and never
//! mutated afterwards.

use std::collections::BTreeMap;

use crate::effect::{ComboRule, EffectId, EffectTemplate, ResistanceRule};
use crate::error::{ErrorSeverity, GameError};

/// Read-only lookup of effect templates and interaction rules.
pub trait EffectCatalog: Send + Sync {
    /// Looks up a template. `None` means "not found"; never fatal.
    fn template(&self, id: &str) -> Option<&EffectTemplate>;

    /// Combo rules in evaluation order.
    fn combo_rules(&self) -> &[ComboRule];

    /// Resistance ("countered by") rules in evaluation order.
    fn resistance_rules(&self) -> &[ResistanceRule];

    /// Effect ids ordered by removal priority; index 0 is removed first.
    fn cleanse_priority(&self) -> &[EffectId];

    /// Position of `id` in the cleanse priority list.
    fn priority_of(&self, id: &EffectId) -> Option<usize> {
        self.cleanse_priority().iter().position(|p| p == id)
    }
}

/// Errors found while assembling a catalog.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate effect template '{0}'")]
    DuplicateTemplate(EffectId),

    #[error("{rule} references unknown effect '{id}'")]
    UnknownReference { rule: String, id: EffectId },

    #[error("combo '{0}' requires no effects")]
    EmptyCombo(String),

    #[error("combo '{0}' produces one of its own inputs")]
    SelfFeedingCombo(String),
}

impl GameError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateTemplate(_) => "duplicate_template",
            Self::UnknownReference { .. } => "unknown_reference",
            Self::EmptyCombo(_) => "empty_combo",
            Self::SelfFeedingCombo(_) => "self_feeding_combo",
        }
    }
}

/// In-memory catalog backed by plain tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticCatalog {
    templates: BTreeMap<EffectId, EffectTemplate>,
    combos: Vec<ComboRule>,
    resistances: Vec<ResistanceRule>,
    cleanse_priority: Vec<EffectId>,
}

impl StaticCatalog {
    pub fn builder() -> StaticCatalogBuilder {
        StaticCatalogBuilder::default()
    }

    /// Catalog with no templates and no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds and validates a catalog from flat tables.
    pub fn from_parts(
        templates: Vec<EffectTemplate>,
        combos: Vec<ComboRule>,
        resistances: Vec<ResistanceRule>,
        cleanse_priority: Vec<EffectId>,
    ) -> Result<Self, CatalogError> {
        let mut builder = Self::builder();
        for template in templates {
            builder = builder.template(template);
        }
        for combo in combos {
            builder = builder.combo(combo);
        }
        for resistance in resistances {
            builder = builder.resistance(resistance);
        }
        builder.cleanse_priority(cleanse_priority).build()
    }

    pub fn templates(&self) -> impl Iterator<Item = &EffectTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Checks that every rule refers to known templates.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let known = |rule: &str, id: &EffectId| {
            if self.templates.contains_key(id) {
                Ok(())
            } else {
                Err(CatalogError::UnknownReference {
                    rule: rule.to_string(),
                    id: id.clone(),
                })
            }
        };

        for combo in &self.combos {
            if combo.requires.is_empty() {
                return Err(CatalogError::EmptyCombo(combo.name.clone()));
            }
            if combo.involves(&combo.result) {
                return Err(CatalogError::SelfFeedingCombo(combo.name.clone()));
            }
            let label = format!("combo '{}'", combo.name);
            for id in &combo.requires {
                known(&label, id)?;
            }
            known(&label, &combo.result)?;
        }

        for rule in &self.resistances {
            let label = format!("resistance of '{}'", rule.effect);
            known(&label, &rule.effect)?;
            known(&label, &rule.countered_by)?;
        }

        for id in &self.cleanse_priority {
            known("cleanse priority", id)?;
        }

        Ok(())
    }
}

impl EffectCatalog for StaticCatalog {
    fn template(&self, id: &str) -> Option<&EffectTemplate> {
        self.templates.get(id)
    }

    fn combo_rules(&self) -> &[ComboRule] {
        &self.combos
    }

    fn resistance_rules(&self) -> &[ResistanceRule] {
        &self.resistances
    }

    fn cleanse_priority(&self) -> &[EffectId] {
        &self.cleanse_priority
    }
}

/// Fluent builder for [`StaticCatalog`].
#[derive(Debug, Default)]
pub struct StaticCatalogBuilder {
    templates: Vec<EffectTemplate>,
    combos: Vec<ComboRule>,
    resistances: Vec<ResistanceRule>,
    cleanse_priority: Vec<EffectId>,
}

impl StaticCatalogBuilder {
    pub fn template(mut self, template: EffectTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn combo(mut self, combo: ComboRule) -> Self {
        self.combos.push(combo);
        self
    }

    pub fn resistance(mut self, rule: ResistanceRule) -> Self {
        self.resistances.push(rule);
        self
    }

    pub fn cleanse_priority<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EffectId>,
    {
        self.cleanse_priority = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<StaticCatalog, CatalogError> {
        let mut templates = BTreeMap::new();
        for template in self.templates {
            let id = template.id.clone();
            if templates.insert(id.clone(), template).is_some() {
                return Err(CatalogError::DuplicateTemplate(id));
            }
        }

        let catalog = StaticCatalog {
            templates,
            combos: self.combos,
            resistances: self.resistances,
            cleanse_priority: self.cleanse_priority,
        };
        catalog.validate()?;

        tracing::debug!(
            templates = catalog.templates.len(),
            combos = catalog.combos.len(),
            resistances = catalog.resistances.len(),
            "effect catalog built"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectCategory, EffectDuration};

    fn debuff(id: &str) -> EffectTemplate {
        EffectTemplate::new(id, id, EffectCategory::Debuff, EffectDuration::Turns(2))
    }

    #[test]
    fn lookup_returns_none_for_unknown_ids() {
        let catalog = StaticCatalog::builder()
            .template(debuff("wet"))
            .build()
            .unwrap();

        assert!(catalog.template("wet").is_some());
        assert!(catalog.template("dry").is_none());
    }

    #[test]
    fn rejects_duplicate_templates() {
        let result = StaticCatalog::builder()
            .template(debuff("wet"))
            .template(debuff("wet"))
            .build();
        assert_eq!(result, Err(CatalogError::DuplicateTemplate("wet".into())));
    }

    #[test]
    fn rejects_rules_with_unknown_references() {
        let result = StaticCatalog::builder()
            .template(debuff("wet"))
            .combo(ComboRule::new("storm", ["wet", "shock"], "wet_paralysis"))
            .build();
        assert!(matches!(
            result,
            Err(CatalogError::UnknownReference { ref id, .. }) if id == "shock"
        ));

        let result = StaticCatalog::builder()
            .template(debuff("wet"))
            .cleanse_priority(["poison"])
            .build();
        assert!(matches!(result, Err(CatalogError::UnknownReference { .. })));
    }

    #[test]
    fn rejects_combos_that_feed_themselves() {
        let result = StaticCatalog::builder()
            .template(debuff("wet"))
            .template(debuff("shock"))
            .combo(ComboRule::new("loop", ["wet", "shock"], "wet"))
            .build();
        assert_eq!(result, Err(CatalogError::SelfFeedingCombo("loop".into())));
    }

    #[test]
    fn priority_of_uses_list_position() {
        let catalog = StaticCatalog::builder()
            .template(debuff("poison"))
            .template(debuff("slow"))
            .cleanse_priority(["slow", "poison"])
            .build()
            .unwrap();

        assert_eq!(catalog.priority_of(&"slow".into()), Some(0));
        assert_eq!(catalog.priority_of(&"poison".into()), Some(1));
        assert_eq!(catalog.priority_of(&"wet".into()), None);
    }
}
