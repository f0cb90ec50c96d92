//! Immutable effect definitions.
//!
//! An [`EffectTemplate`] describes what an effect *is*; the per-combatant
//! [`ActiveEffect`](super::ActiveEffect) records how much of it is currently
//! applied. Templates are owned by the catalog and never change at runtime.

use core::borrow::Borrow;
use core::fmt;

use bitflags::bitflags;

/// Identifier of an effect template (`"burning"`, `"divine_blessing"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectId(String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EffectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for EffectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EffectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EffectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EffectId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Broad classification used by cleanse/dispel defaults and immunities.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectCategory {
    /// Beneficial to its bearer. Default target of dispel.
    Buff,
    /// Harmful to its bearer. Default target of cleanse.
    Debuff,
    /// Neither; only removed by explicit request.
    Special,
}

/// How long a freshly applied effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Expires after this many of its bearer's turns.
    Turns(u32),
    /// Never counts down; only removal ends it.
    UntilCleansed,
}

impl EffectDuration {
    /// Remaining turns for a new instance, `None` for the sentinel.
    pub const fn turns(self) -> Option<u32> {
        match self {
            Self::Turns(n) => Some(n),
            Self::UntilCleansed => None,
        }
    }
}

bitflags! {
    /// Special behaviours an effect grants its bearer.
    ///
    /// Flags from every active effect and aura are OR-ed together in
    /// [`AggregatedModifiers`](super::AggregatedModifiers).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct EffectFlags: u8 {
        /// Attacks against the bearer automatically miss.
        const UNTARGETABLE     = 1 << 0;
        /// Immune to cleanse, dispel and explicit removal. Still expires.
        const CANNOT_REMOVE    = 1 << 1;
        /// Removed as soon as the bearer takes direct damage.
        const BREAKS_ON_DAMAGE = 1 << 2;
        /// Removed as soon as the bearer attacks.
        const BREAKS_ON_ATTACK = 1 << 3;
        /// Bearer loses its turns while the effect lasts.
        const STUNNED          = 1 << 4;
    }
}

/// Flat stat bonuses, scaled by stack count when aggregated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatBonuses {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub magic: i32,
}

/// What an effect blocks while it is active on a combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Immunities {
    pub categories: Vec<EffectCategory>,
    pub effects: Vec<EffectId>,
    pub tags: Vec<String>,
}

impl Immunities {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.effects.is_empty() && self.tags.is_empty()
    }

    /// Returns true if an effect built from `template` would be blocked.
    pub fn blocks(&self, template: &EffectTemplate) -> bool {
        self.categories.contains(&template.category)
            || self.effects.contains(&template.id)
            || template.tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Structured payload of an effect.
///
/// Percent fields are integers (`20` = 20%), following the flat / increased /
/// more vocabulary of stat bonuses:
/// - `damage_pct` and `magic_damage_pct` are *increased* bonuses: summed, then
///   added to a base of 1.0
/// - `defense_more_pct` is a *more* bonus: each instance multiplies
/// - chance-like fields sum directly
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectPayload {
    pub stats: StatBonuses,
    pub damage_pct: i32,
    pub magic_damage_pct: i32,
    pub defense_more_pct: i32,
    pub crit_chance: i32,
    pub dodge_chance: i32,
    pub life_steal: i32,
    pub damage_reduction: i32,
    pub damage_per_turn: u32,
    pub heal_per_turn: u32,
    pub heal_pct_max_hp: u32,
    pub flags: EffectFlags,
    pub immunities: Immunities,
}

impl EffectPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this payload does anything during a tick.
    pub fn ticks(&self) -> bool {
        self.damage_per_turn > 0 || self.heal_per_turn > 0 || self.heal_pct_max_hp > 0
    }
}

/// Immutable definition of an effect, keyed by [`EffectId`] in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTemplate {
    pub id: EffectId,
    pub name: String,
    pub category: EffectCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stackable: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_max_stacks"))]
    pub max_stacks: u8,
    pub duration: EffectDuration,
    #[cfg_attr(feature = "serde", serde(default))]
    pub payload: EffectPayload,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_max_stacks() -> u8 {
    1
}

impl EffectTemplate {
    /// Non-stackable template with an empty payload.
    pub fn new(
        id: impl Into<EffectId>,
        name: impl Into<String>,
        category: EffectCategory,
        duration: EffectDuration,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            stackable: false,
            max_stacks: 1,
            duration,
            payload: EffectPayload::default(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn stacking(mut self, max_stacks: u8) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks.max(1);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: EffectPayload) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum stacks this template honours; 1 when not stackable.
    pub fn stack_limit(&self) -> u8 {
        if self.stackable {
            self.max_stacks.max(1)
        } else {
            1
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_removable(&self) -> bool {
        !self.payload.flags.contains(EffectFlags::CANNOT_REMOVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_limit_ignores_max_when_not_stackable() {
        let mut template =
            EffectTemplate::new("shield", "Shield", EffectCategory::Buff, EffectDuration::Turns(2));
        template.max_stacks = 5;
        assert_eq!(template.stack_limit(), 1);

        let template = template.stacking(3);
        assert_eq!(template.stack_limit(), 3);
    }

    #[test]
    fn immunities_match_category_id_and_tag() {
        let cursed = EffectTemplate::new("cursed", "Cursed", EffectCategory::Debuff, EffectDuration::Turns(3))
            .with_tags(["curse", "shadow"]);

        let by_tag = Immunities {
            tags: vec!["curse".into()],
            ..Default::default()
        };
        let by_id = Immunities {
            effects: vec!["cursed".into()],
            ..Default::default()
        };
        let by_category = Immunities {
            categories: vec![EffectCategory::Debuff],
            ..Default::default()
        };
        let unrelated = Immunities {
            categories: vec![EffectCategory::Buff],
            tags: vec!["fire".into()],
            ..Default::default()
        };

        assert!(by_tag.blocks(&cursed));
        assert!(by_id.blocks(&cursed));
        assert!(by_category.blocks(&cursed));
        assert!(!unrelated.blocks(&cursed));
    }

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(EffectCategory::Debuff.as_ref(), "debuff");
        assert_eq!("buff".parse::<EffectCategory>().ok(), Some(EffectCategory::Buff));
    }
}
