//! Hit, dodge and critical-chance checks.

use crate::config::CombatConfig;
use crate::effect::{AggregatedModifiers, EffectFlags};
use crate::env::RandomSource;
use crate::state::Side;

/// Whether an attack connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitCheck {
    Hit,
    /// The defender cannot be targeted at all.
    Untargetable,
    /// The defender's dodge roll succeeded.
    Dodged,
}

/// Resolves whether an attack lands.
///
/// Uncontested attacks (a free hit after a failed escape) always land.
/// A dodge roll is only drawn when the defender has a dodge chance, so
/// combatants without dodge effects consume no randomness here.
pub fn check_hit(
    defender: &AggregatedModifiers,
    contested: bool,
    rng: &mut (impl RandomSource + ?Sized),
) -> HitCheck {
    if !contested {
        return HitCheck::Hit;
    }
    if defender.has_flag(EffectFlags::UNTARGETABLE) {
        return HitCheck::Untargetable;
    }
    if defender.dodge_chance > 0.0 && rng.chance(defender.dodge_chance) {
        return HitCheck::Dodged;
    }
    HitCheck::Hit
}

/// Critical chance for an attacker on `side`.
///
/// # Formula
///
/// ```text
/// crit = clamp(side_base + modifiers.crit_chance, 0, 1)
/// ```
pub fn crit_chance(config: &CombatConfig, side: Side, attacker: &AggregatedModifiers) -> f64 {
    (config.base_crit_chance(side) + attacker.crit_chance).clamp(0.0, 1.0)
}
