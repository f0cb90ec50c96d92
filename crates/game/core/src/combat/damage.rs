//! Damage calculation and application.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::CombatConfig;
use crate::env::RandomSource;

// ============================================================================
// Damage School
// ============================================================================

/// Which attribute and multiplier an attack scales with.
///
/// Elemental schools scale like [`Magic`](Self::Magic) and are the ones an
/// [`ElementalAffinity`] usually names.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageSchool {
    /// Scales with attack and the damage multiplier.
    #[default]
    Physical,
    /// Scales with magic and the magic-damage multiplier.
    Magic,
    Fire,
    Ice,
    Lightning,
    Poison,
    Holy,
    Shadow,
}

impl DamageSchool {
    /// Whether the attack scales with attack rather than magic.
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::Physical)
    }
}

/// Per-combatant weaknesses and flat resistances by damage school.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElementalAffinity {
    pub vulnerabilities: BTreeSet<DamageSchool>,
    /// Flat damage subtracted from hits of the school.
    pub resistances: BTreeMap<DamageSchool, u32>,
}

impl ElementalAffinity {
    pub fn is_vulnerable(&self, school: DamageSchool) -> bool {
        self.vulnerabilities.contains(&school)
    }

    pub fn resistance(&self, school: DamageSchool) -> u32 {
        self.resistances.get(&school).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.vulnerabilities.is_empty() && self.resistances.is_empty()
    }
}

/// Outcome of one damage roll, before defender mitigation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRoll {
    /// Pre-variance, pre-critical damage.
    pub raw: f64,
    pub critical: bool,
    /// Final integer damage, at least 1.
    pub amount: u32,
}

// ============================================================================
// Damage Calculation
// ============================================================================

/// Raw damage before variance, criticals and multipliers.
///
/// # Formula
///
/// ```text
/// raw = max(1, attack - 0.5 × defense)
/// ```
pub fn raw_damage(attack: f64, defense: f64) -> f64 {
    (attack - 0.5 * defense).max(1.0)
}

/// Rolls a complete hit.
///
/// # Formula
///
/// ```text
/// raw      = max(1, attack - 0.5 × defense)
/// critical = roll < crit_chance
/// scaled   = critical ? raw × crit_multiplier
///                     : raw × uniform(1 - variance, 1 + variance)
/// amount   = max(1, floor(scaled × multiplier))
/// ```
///
/// A critical hit skips variance: with attack 20 against defense 5 a normal
/// hit lands in `[15, 19]` and a critical is exactly 35.
///
/// The critical roll is drawn first, then the variance roll (normal hits
/// only).
pub fn roll_damage(
    attack: f64,
    defense: f64,
    multiplier: f64,
    crit_chance: f64,
    config: &CombatConfig,
    rng: &mut (impl RandomSource + ?Sized),
) -> DamageRoll {
    let raw = raw_damage(attack, defense);
    let critical = rng.chance(crit_chance);

    let scaled = if critical {
        raw * config.crit_multiplier
    } else {
        let variance = config.damage_variance.abs();
        raw * rng.uniform(1.0 - variance, 1.0 + variance)
    };

    DamageRoll {
        raw,
        critical,
        amount: floor_at_least_one(scaled * multiplier),
    }
}

/// Applies the defender's damage reduction, capped by `cap`.
pub fn mitigate(amount: u32, reduction: f64, cap: f64) -> u32 {
    if reduction <= 0.0 {
        return amount;
    }
    let reduction = reduction.min(cap).min(1.0);
    floor_at_least_one(f64::from(amount) * (1.0 - reduction))
}

/// Adjusts a mitigated hit for the defender's affinity to `school`.
///
/// # Formula
///
/// ```text
/// amount = vulnerable ? floor(amount × vulnerability_multiplier) : amount
/// amount = resisted   ? max(1, amount - resistance)              : amount
/// ```
pub fn elemental_adjust(
    amount: u32,
    school: DamageSchool,
    affinity: &ElementalAffinity,
    vulnerability_multiplier: f64,
) -> u32 {
    let mut amount = amount;
    if affinity.is_vulnerable(school) {
        amount = floor_at_least_one(f64::from(amount) * vulnerability_multiplier);
    }
    match affinity.resistance(school) {
        0 => amount,
        resist => amount.saturating_sub(resist).max(1),
    }
}

/// Apply damage to current HP.
///
/// # Returns
///
/// New HP value (clamped to 0)
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}

/// Apply healing, clamped to maximum HP.
pub fn apply_heal(current_hp: u32, max_hp: u32, heal: u32) -> u32 {
    current_hp.saturating_add(heal).min(max_hp)
}

fn floor_at_least_one(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.floor().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}
