//! Combat actions and the effects they carry.
//!
//! Every way of spending a turn is a variant of [`CombatAction`] and flows
//! through one transition function in the engine. Abilities and consumable
//! items share the same building blocks ([`ActionEffect`]), so "use ability"
//! and "use item" differ only in how they are gated (cooldown vs quantity).

use crate::combat::DamageSchool;
use crate::effect::EffectId;

/// A turn's worth of intent from one side.
#[derive(Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatAction {
    /// Basic attack with the physical school.
    Attack,
    /// Use an ability by id.
    UseAbility(String),
    /// Consume an item by id.
    UseItem(String),
    /// Attempt to escape.
    Flee,
}

impl CombatAction {
    pub fn ability(id: impl Into<String>) -> Self {
        Self::UseAbility(id.into())
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self::UseItem(id.into())
    }
}

/// Who an [`ActionEffect::ApplyEffect`] lands on, relative to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectTarget {
    /// The user of the ability or item.
    #[default]
    Own,
    /// The other side.
    Opponent,
}

/// One step of an ability or item, resolved in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionEffect {
    /// Strike the opponent; `power_pct` scales the attacking attribute
    /// (100 = a basic attack's worth).
    Damage { power_pct: u32, school: DamageSchool },
    /// Restore a flat amount of the user's health.
    Heal(u32),
    /// Restore a percentage of the user's maximum health.
    HealPercent(u32),
    /// Apply a catalog effect, optionally overriding its duration.
    ApplyEffect {
        effect: EffectId,
        target: EffectTarget,
        duration: Option<u32>,
    },
    /// Remove up to `count` of the user's debuffs.
    Cleanse { count: usize },
    /// Remove up to `count` of the opponent's buffs.
    Dispel { count: usize },
}

impl ActionEffect {
    pub fn damage(power_pct: u32) -> Self {
        Self::Damage {
            power_pct,
            school: DamageSchool::Physical,
        }
    }

    pub fn magic(power_pct: u32) -> Self {
        Self::Damage {
            power_pct,
            school: DamageSchool::Magic,
        }
    }

    pub fn apply_to(target: EffectTarget, effect: impl Into<EffectId>) -> Self {
        Self::ApplyEffect {
            effect: effect.into(),
            target,
            duration: None,
        }
    }

    /// True if resolving this step counts as attacking.
    pub fn is_offensive(&self) -> bool {
        matches!(self, Self::Damage { .. })
    }
}

/// An ability definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: String,
    pub name: String,
    /// Turns before the ability can be used again (0 = every turn).
    pub cooldown: u32,
    pub effects: Vec<ActionEffect>,
}

impl Ability {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cooldown: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cooldown,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: ActionEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A consumable item in a combatant's bag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub effects: Vec<ActionEffect>,
}

impl CombatItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: ActionEffect) -> Self {
        self.effects.push(effect);
        self
    }
}
