//! Interaction rules between effects: combos and counters.

use super::template::EffectId;

/// Consumes a set of co-active effects and replaces them with a result.
///
/// `wet` + `shock` → `paralyzed`: once every required effect is active on the
/// same track, all of them are removed and `result` is applied in their place.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboRule {
    pub name: String,
    pub requires: Vec<EffectId>,
    pub result: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus_damage: u32,
}

impl ComboRule {
    pub fn new<I, S>(name: impl Into<String>, requires: I, result: impl Into<EffectId>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EffectId>,
    {
        Self {
            name: name.into(),
            requires: requires.into_iter().map(Into::into).collect(),
            result: result.into(),
            bonus_damage: 0,
        }
    }

    #[must_use]
    pub fn with_bonus_damage(mut self, bonus_damage: u32) -> Self {
        self.bonus_damage = bonus_damage;
        self
    }

    /// True if `id` is one of this rule's inputs.
    pub fn involves(&self, id: &EffectId) -> bool {
        self.requires.contains(id)
    }
}

/// Applying `effect` is rejected while `countered_by` is active.
///
/// The relation is one-directional: `burning` countered by `wet` says nothing
/// about applying `wet` onto a burning target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistanceRule {
    pub effect: EffectId,
    pub countered_by: EffectId,
}

impl ResistanceRule {
    pub fn new(effect: impl Into<EffectId>, countered_by: impl Into<EffectId>) -> Self {
        Self {
            effect: effect.into(),
            countered_by: countered_by.into(),
        }
    }
}
