//! Combatants: one side of a fight.

use std::sync::Arc;

use crate::action::{Ability, CombatItem};
use crate::combat::{DamageSchool, ElementalAffinity, apply_damage, apply_heal};
use crate::effect::{AggregatedModifiers, EffectId, EffectTrack};
use crate::env::EffectCatalog;

/// Which side of the session a combatant fights on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    /// The human-controlled side.
    Player,
    /// The automatically controlled side.
    Opponent,
}

impl Side {
    pub const fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

/// Threat tier of a combatant. Bosses cannot be fled from and can enrage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tier {
    #[default]
    Normal,
    Elite,
    Boss,
}

/// Base attributes supplied by the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub magic: u32,
}

/// An ability together with its cooldown counter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySlot {
    pub ability: Ability,
    /// Own turns left before the ability is ready (0 = ready).
    pub cooldown_remaining: u32,
}

impl AbilitySlot {
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}

/// A status effect a combatant's landed hits may inflict.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnHitEffect {
    pub effect: EffectId,
    /// Probability in `[0.0, 1.0]`, rolled once per landed hit.
    pub chance: f64,
    /// Overrides the template duration.
    pub duration: Option<u32>,
}

/// One participant of a [`CombatSession`](crate::engine::CombatSession).
#[derive(Clone, Debug)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub tier: Tier,
    pub health: u32,
    pub max_health: u32,
    pub attributes: Attributes,
    pub affinity: ElementalAffinity,
    pub(crate) effects: EffectTrack,
    pub(crate) abilities: Vec<AbilitySlot>,
    pub(crate) items: Vec<CombatItem>,
    pub(crate) on_hit: Vec<OnHitEffect>,
}

impl Combatant {
    /// Starts building a combatant whose effect track reads `catalog`.
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        catalog: Arc<dyn EffectCatalog>,
    ) -> CombatantBuilder {
        CombatantBuilder {
            id: id.into(),
            name: name.into(),
            side: Side::Player,
            tier: Tier::Normal,
            health: None,
            max_health: 1,
            attributes: Attributes::default(),
            affinity: ElementalAffinity::default(),
            abilities: Vec::new(),
            items: Vec::new(),
            on_hit: Vec::new(),
            catalog,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn is_boss(&self) -> bool {
        self.tier == Tier::Boss
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health == 0 {
            0.0
        } else {
            f64::from(self.health) / f64::from(self.max_health)
        }
    }

    pub fn effects(&self) -> &EffectTrack {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectTrack {
        &mut self.effects
    }

    pub fn modifiers(&self) -> AggregatedModifiers {
        self.effects.modifiers()
    }

    pub fn abilities(&self) -> &[AbilitySlot] {
        &self.abilities
    }

    pub fn ability(&self, id: &str) -> Option<&AbilitySlot> {
        self.abilities.iter().find(|slot| slot.ability.id == id)
    }

    pub(crate) fn ability_mut(&mut self, id: &str) -> Option<&mut AbilitySlot> {
        self.abilities.iter_mut().find(|slot| slot.ability.id == id)
    }

    /// Abilities that are off cooldown, in definition order.
    pub fn ready_abilities(&self) -> Vec<&Ability> {
        self.abilities
            .iter()
            .filter(|slot| slot.is_ready())
            .map(|slot| &slot.ability)
            .collect()
    }

    pub fn items(&self) -> &[CombatItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&CombatItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn on_hit_effects(&self) -> &[OnHitEffect] {
        &self.on_hit
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut CombatItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Counts running cooldowns down by one, except the ability used this turn.
    pub(crate) fn tick_cooldowns(&mut self, used_this_turn: Option<&str>) {
        for slot in &mut self.abilities {
            if used_this_turn == Some(slot.ability.id.as_str()) {
                continue;
            }
            slot.cooldown_remaining = slot.cooldown_remaining.saturating_sub(1);
        }
    }

    /// Reduces health; returns the amount actually lost.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = apply_damage(before, amount);
        before - self.health
    }

    /// Restores health up to the maximum; returns the amount actually gained.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = apply_heal(before, self.max_health, amount);
        self.health - before
    }
}

/// Builder for [`Combatant`].
pub struct CombatantBuilder {
    id: String,
    name: String,
    side: Side,
    tier: Tier,
    health: Option<u32>,
    max_health: u32,
    attributes: Attributes,
    affinity: ElementalAffinity,
    abilities: Vec<AbilitySlot>,
    items: Vec<CombatItem>,
    on_hit: Vec<OnHitEffect>,
    catalog: Arc<dyn EffectCatalog>,
}

impl CombatantBuilder {
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Sets maximum health; current health starts full unless overridden.
    pub fn max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health.max(1);
        self
    }

    /// Current health (clamped to the maximum at build time).
    pub fn health(mut self, health: u32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn attack(mut self, attack: u32) -> Self {
        self.attributes.attack = attack;
        self
    }

    pub fn defense(mut self, defense: u32) -> Self {
        self.attributes.defense = defense;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.attributes.speed = speed;
        self
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.attributes.magic = magic;
        self
    }

    pub fn affinity(mut self, affinity: ElementalAffinity) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn vulnerable_to(mut self, school: DamageSchool) -> Self {
        self.affinity.vulnerabilities.insert(school);
        self
    }

    /// Flat reduction of every hit of `school`; repeated calls accumulate.
    pub fn resist(mut self, school: DamageSchool, amount: u32) -> Self {
        let entry = self.affinity.resistances.entry(school).or_insert(0);
        *entry = entry.saturating_add(amount);
        self
    }

    /// Lets landed hits inflict `effect` with probability `chance`.
    pub fn on_hit(mut self, effect: impl Into<EffectId>, chance: f64) -> Self {
        self.on_hit.push(OnHitEffect {
            effect: effect.into(),
            chance,
            duration: None,
        });
        self
    }

    pub fn on_hit_effect(mut self, on_hit: OnHitEffect) -> Self {
        self.on_hit.push(on_hit);
        self
    }

    pub fn ability(self, ability: Ability) -> Self {
        self.ability_with_cooldown(ability, 0)
    }

    /// Adds an ability whose cooldown is already running.
    pub fn ability_with_cooldown(mut self, ability: Ability, cooldown_remaining: u32) -> Self {
        self.abilities.push(AbilitySlot {
            ability,
            cooldown_remaining,
        });
        self
    }

    pub fn item(mut self, item: CombatItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> Combatant {
        let health = self.health.unwrap_or(self.max_health).min(self.max_health);
        Combatant {
            id: self.id,
            name: self.name,
            side: self.side,
            tier: self.tier,
            health,
            max_health: self.max_health,
            attributes: self.attributes,
            affinity: self.affinity,
            effects: EffectTrack::new(self.catalog),
            abilities: self.abilities,
            items: self.items,
            on_hit: self.on_hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticCatalog;

    fn combatant() -> Combatant {
        Combatant::builder("hero", "Hero", Arc::new(StaticCatalog::empty()))
            .max_health(40)
            .health(30)
            .ability(Ability::new("bash", "Bash", 2))
            .build()
    }

    #[test]
    fn health_changes_are_clamped() {
        let mut hero = combatant();
        assert_eq!(hero.heal(50), 10);
        assert_eq!(hero.health, 40);
        assert_eq!(hero.take_damage(100), 40);
        assert!(hero.is_defeated());
    }

    #[test]
    fn cooldowns_skip_the_ability_used_this_turn() {
        let mut hero = combatant();
        hero.ability_mut("bash").unwrap().cooldown_remaining = 2;

        hero.tick_cooldowns(Some("bash"));
        assert_eq!(hero.ability("bash").unwrap().cooldown_remaining, 2);

        hero.tick_cooldowns(None);
        hero.tick_cooldowns(None);
        assert!(hero.ability("bash").unwrap().is_ready());
        assert_eq!(hero.ready_abilities().len(), 1);
    }

    #[test]
    fn builder_accumulates_affinity_and_on_hit_effects() {
        let ghoul = Combatant::builder("ghoul", "Ghoul", Arc::new(StaticCatalog::empty()))
            .vulnerable_to(DamageSchool::Holy)
            .resist(DamageSchool::Shadow, 3)
            .resist(DamageSchool::Shadow, 2)
            .on_hit("poison", 0.25)
            .build();
        assert!(ghoul.affinity.is_vulnerable(DamageSchool::Holy));
        assert_eq!(ghoul.affinity.resistance(DamageSchool::Shadow), 5);
        assert_eq!(ghoul.on_hit_effects().len(), 1);
        assert_eq!(ghoul.on_hit_effects()[0].effect, "poison");
    }

    #[test]
    fn builder_clamps_health_to_maximum() {
        let hero = Combatant::builder("hero", "Hero", Arc::new(StaticCatalog::empty()))
            .max_health(10)
            .health(99)
            .build();
        assert_eq!(hero.health, 10);
        assert!((hero.health_fraction() - 1.0).abs() < f64::EPSILON);
    }
}
