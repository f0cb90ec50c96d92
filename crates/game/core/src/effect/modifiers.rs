//! Aggregated modifiers - the combined effect of everything on a track.
//!
//! Composition follows the flat → increased → more order:
//!
//! ```text
//! stats              = Σ flat × stacks
//! damage_multiplier  = 1 + Σ damage_pct × stacks / 100        (increased)
//! magic_multiplier   = 1 + Σ magic_damage_pct × stacks / 100  (increased)
//! defense_multiplier = Π (1 + defense_more_pct / 100) ^ stacks (more)
//! chances            = Σ pct × stacks / 100
//! flags              = ⋃ flags
//! ```
//!
//! Two +20% damage effects therefore give ×1.4, while two +20% defense
//! effects give ×1.44.

use super::template::{EffectFlags, EffectPayload, StatBonuses};

/// Folded view of every active effect and aura on one combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatedModifiers {
    pub stats: StatBonuses,
    pub damage_multiplier: f64,
    pub magic_damage_multiplier: f64,
    pub defense_multiplier: f64,
    /// Fractions in `[0, 1]`-ish; callers clamp where it matters.
    pub crit_chance: f64,
    pub dodge_chance: f64,
    pub life_steal: f64,
    pub damage_reduction: f64,
    pub flags: EffectFlags,
}

impl Default for AggregatedModifiers {
    fn default() -> Self {
        Self::neutral()
    }
}

impl AggregatedModifiers {
    /// Modifiers of a combatant with nothing applied.
    pub const fn neutral() -> Self {
        Self {
            stats: StatBonuses {
                attack: 0,
                defense: 0,
                speed: 0,
                magic: 0,
            },
            damage_multiplier: 1.0,
            magic_damage_multiplier: 1.0,
            defense_multiplier: 1.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            life_steal: 0.0,
            damage_reduction: 0.0,
            flags: EffectFlags::empty(),
        }
    }

    /// Folds `(payload, stacks)` pairs into one set of modifiers.
    pub fn fold<'a>(entries: impl IntoIterator<Item = (&'a EffectPayload, u8)>) -> Self {
        let mut acc = Accumulator::default();
        for (payload, stacks) in entries {
            acc.add(payload, stacks);
        }
        acc.finish()
    }

    pub fn has_flag(&self, flag: EffectFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Attack after flat bonuses, floored at zero.
    pub fn attack(&self, base: u32) -> f64 {
        (base as f64 + f64::from(self.stats.attack)).max(0.0)
    }

    /// Magic after flat bonuses, floored at zero.
    pub fn magic(&self, base: u32) -> f64 {
        (base as f64 + f64::from(self.stats.magic)).max(0.0)
    }

    /// Defense after flat bonuses and the multiplicative defense layer.
    pub fn defense(&self, base: u32) -> f64 {
        ((base as f64 + f64::from(self.stats.defense)) * self.defense_multiplier).max(0.0)
    }

    /// Speed after flat bonuses.
    pub fn speed(&self, base: u32) -> f64 {
        base as f64 + f64::from(self.stats.speed)
    }
}

/// Integer sums collected before converting to multipliers.
#[derive(Default)]
struct Accumulator {
    stats: StatBonuses,
    damage_pct: i64,
    magic_damage_pct: i64,
    defense_product: f64,
    has_defense_layer: bool,
    crit_chance: i64,
    dodge_chance: i64,
    life_steal: i64,
    damage_reduction: i64,
    flags: EffectFlags,
}

impl Accumulator {
    fn add(&mut self, payload: &EffectPayload, stacks: u8) {
        let n = i32::from(stacks);
        let wide = i64::from(stacks);

        self.stats.attack += payload.stats.attack * n;
        self.stats.defense += payload.stats.defense * n;
        self.stats.speed += payload.stats.speed * n;
        self.stats.magic += payload.stats.magic * n;

        self.damage_pct += i64::from(payload.damage_pct) * wide;
        self.magic_damage_pct += i64::from(payload.magic_damage_pct) * wide;

        if payload.defense_more_pct != 0 {
            let factor = (1.0 + f64::from(payload.defense_more_pct) / 100.0).max(0.0);
            let layer = factor.powi(n);
            if self.has_defense_layer {
                self.defense_product *= layer;
            } else {
                self.defense_product = layer;
                self.has_defense_layer = true;
            }
        }

        self.crit_chance += i64::from(payload.crit_chance) * wide;
        self.dodge_chance += i64::from(payload.dodge_chance) * wide;
        self.life_steal += i64::from(payload.life_steal) * wide;
        self.damage_reduction += i64::from(payload.damage_reduction) * wide;

        self.flags |= payload.flags;
    }

    fn finish(self) -> AggregatedModifiers {
        let pct = |v: i64| v as f64 / 100.0;
        AggregatedModifiers {
            stats: self.stats,
            damage_multiplier: (1.0 + pct(self.damage_pct)).max(0.0),
            magic_damage_multiplier: (1.0 + pct(self.magic_damage_pct)).max(0.0),
            defense_multiplier: if self.has_defense_layer {
                self.defense_product
            } else {
                1.0
            },
            crit_chance: pct(self.crit_chance),
            dodge_chance: pct(self.dodge_chance),
            life_steal: pct(self.life_steal),
            damage_reduction: pct(self.damage_reduction),
            flags: self.flags,
        }
    }
}
