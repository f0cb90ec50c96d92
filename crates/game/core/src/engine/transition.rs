//! Action resolution.
//!
//! Every accepted action, whether the player's or an automatic one, is
//! resolved here. The helpers mutate the session, write the log and queue
//! events; terminal checks run after every health change so the session
//! stops resolving as soon as one side falls.

use crate::action::{ActionEffect, CombatAction, EffectTarget};
use crate::combat::{
    DamageSchool, HitCheck, check_hit, crit_chance, elemental_adjust, escape_chance, mitigate,
    roll_damage,
};
use crate::effect::{
    ApplyAction, ApplyOverrides, BreakTrigger, CleanseOptions, ComboTrigger, EffectId,
    RemovalError,
};
use crate::env::RandomSource;
use crate::state::{CombatEvent, CombatState, RemovalReason, Side};

use super::CombatSession;

/// Power of a basic attack, in percent of the attacking attribute.
const BASIC_ATTACK_POWER: u32 = 100;

impl CombatSession {
    /// Resolves `action` for `side` and closes the turn. Returns whether the
    /// action achieved its aim (an attack that connected, a successful escape).
    pub(super) fn execute<R>(&mut self, side: Side, action: &CombatAction, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let (success, used_ability) = match action {
            CombatAction::Attack => (
                self.strike(side, BASIC_ATTACK_POWER, DamageSchool::Physical, true, rng),
                None,
            ),
            CombatAction::UseAbility(id) => (self.perform_ability(side, id, rng), Some(id.as_str())),
            CombatAction::UseItem(id) => (self.perform_item(side, id, rng), None),
            CombatAction::Flee => return self.attempt_flee(side, rng),
        };

        if !self.state.is_terminal() {
            self.end_turn(side, used_ability);
        }
        success
    }

    // ========================================================================
    // Attacks
    // ========================================================================

    /// One attack from `attacker` against the other side.
    ///
    /// Order: hit check, damage roll (critical, variance), defender
    /// mitigation, elemental affinity, break-on-damage, on-hit effects, life
    /// steal, break-on-attack.
    fn strike<R>(
        &mut self,
        attacker: Side,
        power_pct: u32,
        school: DamageSchool,
        contested: bool,
        rng: &mut R,
    ) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let defender = attacker.other();
        let attacker_mods = self.combatant(attacker).modifiers();
        let defender_mods = self.combatant(defender).modifiers();
        let attacker_name = self.combatant(attacker).name.clone();
        let defender_name = self.combatant(defender).name.clone();

        let check = check_hit(&defender_mods, contested, rng);
        if check != HitCheck::Hit {
            let message = match check {
                HitCheck::Untargetable => format!("{attacker_name} cannot reach {defender_name}!"),
                _ => format!("{defender_name} dodges {attacker_name}'s attack!"),
            };
            self.narrate(message);
            self.emit(CombatEvent::Missed { attacker, check });
            self.break_effects(attacker, BreakTrigger::Attacked);
            return false;
        }

        let base = self.combatant(attacker).attributes;
        let (power, multiplier) = if school.is_physical() {
            (
                attacker_mods.attack(base.attack),
                attacker_mods.damage_multiplier,
            )
        } else {
            (
                attacker_mods.magic(base.magic),
                attacker_mods.magic_damage_multiplier,
            )
        };
        let power = power * f64::from(power_pct) / 100.0;
        let defense = defender_mods.defense(self.combatant(defender).attributes.defense);
        let crit = crit_chance(&self.config, attacker, &attacker_mods);

        let roll = roll_damage(power, defense, multiplier, crit, &self.config, rng);
        let amount = mitigate(
            roll.amount,
            defender_mods.damage_reduction,
            self.config.max_damage_reduction,
        );
        let affinity = &self.combatant(defender).affinity;
        let vulnerable = affinity.is_vulnerable(school);
        let amount = elemental_adjust(
            amount,
            school,
            affinity,
            self.config.vulnerability_multiplier,
        );
        let dealt = self.combatant_mut(defender).take_damage(amount);

        if roll.critical {
            self.narrate(format!(
                "Critical hit! {attacker_name} hits {defender_name} for {dealt} damage."
            ));
        } else {
            self.narrate(format!(
                "{attacker_name} hits {defender_name} for {dealt} damage."
            ));
        }
        self.emit(CombatEvent::Damaged {
            target: defender,
            amount: dealt,
            critical: roll.critical,
            source: attacker_name.clone(),
        });
        if vulnerable {
            self.narrate(format!("{defender_name} is vulnerable to {school}!"));
        }
        tracing::debug!(%attacker, dealt, critical = roll.critical, %school, "attack landed");

        self.break_effects(defender, BreakTrigger::Damaged);
        self.inflict_on_hit(attacker, &attacker_name, rng);

        if attacker_mods.life_steal > 0.0 && dealt > 0 {
            let stolen = (f64::from(dealt) * attacker_mods.life_steal).floor() as u32;
            if stolen > 0 {
                let gained = self.combatant_mut(attacker).heal(stolen);
                self.narrate(format!("{attacker_name} drains {gained} health."));
                self.emit(CombatEvent::Healed {
                    target: attacker,
                    amount: gained,
                    source: "life_steal".into(),
                });
            }
        }

        self.break_effects(attacker, BreakTrigger::Attacked);
        self.after_health_change(defender);
        true
    }

    /// Rolls each of the attacker's on-hit effects against a defender still
    /// standing. Nothing is drawn when the attacker has none.
    fn inflict_on_hit<R>(&mut self, attacker: Side, attacker_name: &str, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let defender = attacker.other();
        let procs = self.combatant(attacker).on_hit.clone();
        for on_hit in procs {
            if self.combatant(defender).is_defeated() {
                break;
            }
            if !rng.chance(on_hit.chance) {
                continue;
            }
            let mut overrides = ApplyOverrides::from_source(attacker_name);
            if let Some(turns) = on_hit.duration {
                overrides = overrides.with_duration(turns);
            }
            self.apply_effect(defender, &on_hit.effect, overrides);
        }
    }

    fn break_effects(&mut self, side: Side, trigger: BreakTrigger) {
        let broken = self.combatant_mut(side).effects.break_on(trigger);
        if broken.is_empty() {
            return;
        }
        let name = self.combatant(side).name.clone();
        for id in &broken {
            let label = self.effect_name(side, id);
            self.narrate(format!("{name}'s {label} is broken."));
        }
        self.emit(CombatEvent::EffectsRemoved {
            target: side,
            effects: broken,
            reason: RemovalReason::Broken,
        });
    }

    // ========================================================================
    // Abilities and items
    // ========================================================================

    fn perform_ability<R>(&mut self, side: Side, id: &str, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let Some(slot) = self.combatant_mut(side).ability_mut(id) else {
            return false;
        };
        slot.cooldown_remaining = slot.ability.cooldown;
        let ability = slot.ability.clone();

        let user = self.combatant(side).name.clone();
        self.narrate(format!("{user} uses {}!", ability.name));
        self.resolve_effects(side, &ability.name, &ability.effects, rng)
    }

    fn perform_item<R>(&mut self, side: Side, id: &str, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let Some(item) = self.combatant_mut(side).item_mut(id) else {
            return false;
        };
        item.quantity = item.quantity.saturating_sub(1);
        let (name, left, effects) = (item.name.clone(), item.quantity, item.effects.clone());

        let user = self.combatant(side).name.clone();
        self.narrate(format!("{user} uses {name} ({left} left)."));
        self.resolve_effects(side, &name, &effects, rng)
    }

    /// Resolves ability or item steps in order. Returns false if any damage
    /// step failed to connect.
    fn resolve_effects<R>(
        &mut self,
        side: Side,
        source: &str,
        effects: &[ActionEffect],
        rng: &mut R,
    ) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let mut landed = true;

        for effect in effects {
            if self.state.is_terminal() {
                break;
            }
            match effect {
                ActionEffect::Damage { power_pct, school } => {
                    landed &= self.strike(side, *power_pct, *school, true, rng);
                }
                ActionEffect::Heal(amount) => self.restore(side, *amount, source),
                ActionEffect::HealPercent(pct) => {
                    let max = u64::from(self.combatant(side).max_health);
                    let amount = (max * u64::from(*pct) / 100).min(u64::from(u32::MAX)) as u32;
                    self.restore(side, amount, source);
                }
                ActionEffect::ApplyEffect {
                    effect,
                    target,
                    duration,
                } => {
                    let target = match target {
                        EffectTarget::Own => side,
                        EffectTarget::Opponent => side.other(),
                    };
                    let mut overrides = ApplyOverrides::from_source(source);
                    if let Some(turns) = duration {
                        overrides = overrides.with_duration(*turns);
                    }
                    self.apply_effect(target, effect, overrides);
                }
                ActionEffect::Cleanse { count } => {
                    let removed = self
                        .combatant_mut(side)
                        .effects
                        .cleanse(CleanseOptions::count(*count));
                    self.record_removal(side, removed, RemovalReason::Cleansed);
                }
                ActionEffect::Dispel { count } => {
                    let target = side.other();
                    let removed = self
                        .combatant_mut(target)
                        .effects
                        .dispel(CleanseOptions::count(*count));
                    self.record_removal(target, removed, RemovalReason::Dispelled);
                }
            }
        }

        landed
    }

    fn restore(&mut self, side: Side, amount: u32, source: &str) {
        let gained = self.combatant_mut(side).heal(amount);
        let name = self.combatant(side).name.clone();
        self.narrate(format!("{name} recovers {gained} health."));
        self.emit(CombatEvent::Healed {
            target: side,
            amount: gained,
            source: source.to_owned(),
        });
    }

    fn record_removal(
        &mut self,
        side: Side,
        removed: Result<Vec<EffectId>, RemovalError>,
        reason: RemovalReason,
    ) {
        let name = self.combatant(side).name.clone();
        match removed {
            Ok(ids) if ids.is_empty() => {
                self.narrate(format!("Nothing to remove from {name}."));
            }
            Ok(ids) => {
                for id in &ids {
                    let label = self.effect_name(side, id);
                    self.narrate(format!("{label} is removed from {name}."));
                }
                self.emit(CombatEvent::EffectsRemoved {
                    target: side,
                    effects: ids,
                    reason,
                });
            }
            Err(err) => tracing::debug!(%side, %err, "removal refused"),
        }
    }

    // ========================================================================
    // Status effects
    // ========================================================================

    fn apply_effect(&mut self, target: Side, effect: &EffectId, overrides: ApplyOverrides) {
        let name = self.combatant(target).name.clone();
        let result = self
            .combatant_mut(target)
            .effects
            .apply(effect.as_str(), overrides);

        match result {
            Ok(outcome) => {
                let label = self.effect_name(target, &outcome.effect);
                let message = match outcome.action {
                    ApplyAction::Added => format!("{name} is affected by {label}."),
                    ApplyAction::Stacked => {
                        format!("{label} on {name} stacks to {}.", outcome.stacks)
                    }
                    ApplyAction::Refreshed => format!("{label} on {name} is refreshed."),
                };
                self.narrate(message);
                self.emit(CombatEvent::EffectApplied {
                    target,
                    effect: outcome.effect,
                    action: outcome.action,
                    stacks: outcome.stacks,
                });
                if let Some(combo) = outcome.combo {
                    self.resolve_combo(target, combo);
                }
            }
            Err(reason) => {
                let label = self.effect_name(target, reason.effect());
                self.narrate(format!("{label} has no effect on {name}: {reason}."));
                self.emit(CombatEvent::EffectRejected { target, reason });
            }
        }
    }

    fn resolve_combo(&mut self, target: Side, combo: ComboTrigger) {
        let name = self.combatant(target).name.clone();
        let inputs: Vec<String> = combo
            .consumed
            .iter()
            .map(|id| self.effect_name(target, id))
            .collect();
        let result_label = self.effect_name(target, &combo.result);

        self.narrate(format!(
            "{}! {} on {name} combine into {result_label}.",
            combo.rule,
            inputs.join(" and ")
        ));
        self.emit(CombatEvent::ComboTriggered {
            target,
            rule: combo.rule.clone(),
            consumed: combo.consumed.clone(),
            result: combo.result.clone(),
        });

        match combo.applied {
            Ok(action) => {
                let stacks = self.combatant(target).effects.stacks(combo.result.as_str());
                self.emit(CombatEvent::EffectApplied {
                    target,
                    effect: combo.result,
                    action,
                    stacks,
                });
            }
            Err(reason) => {
                self.narrate(format!("{result_label} has no effect on {name}: {reason}."));
                self.emit(CombatEvent::EffectRejected { target, reason });
            }
        }

        if combo.bonus_damage > 0 {
            let dealt = self.combatant_mut(target).take_damage(combo.bonus_damage);
            self.narrate(format!("{name} takes {dealt} damage from {}.", combo.rule));
            self.emit(CombatEvent::Damaged {
                target,
                amount: dealt,
                critical: false,
                source: combo.rule,
            });
            self.break_effects(target, BreakTrigger::Damaged);
            self.after_health_change(target);
        }
    }

    // ========================================================================
    // Escape
    // ========================================================================

    /// A failed escape ends the runner's turn and hands the other side a
    /// free, uncontested attack before control returns.
    fn attempt_flee<R>(&mut self, side: Side, rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let runner = self.combatant(side);
        let chaser = self.combatant(side.other());
        let chance = escape_chance(
            &self.config,
            runner.modifiers().speed(runner.attributes.speed),
            chaser.modifiers().speed(chaser.attributes.speed),
            runner.health_fraction(),
        );
        let runner_name = runner.name.clone();
        let chaser_name = chaser.name.clone();

        let escaped = rng.chance(chance);
        self.emit(CombatEvent::FleeAttempted {
            chance_pct: (chance * 100.0).round() as u32,
            escaped,
        });
        tracing::debug!(%side, chance, escaped, "escape attempt");

        if escaped {
            self.narrate(format!("{runner_name} escapes from {chaser_name}!"));
            self.conclude(CombatState::Fled);
            return true;
        }

        self.narrate(format!("{runner_name} fails to escape!"));
        self.end_turn(side, None);
        if self.state.is_terminal() {
            return false;
        }

        let chaser_side = side.other();
        if self.combatant(chaser_side).effects.is_incapacitated() {
            self.skip_turn(chaser_side);
            return false;
        }

        self.narrate(format!("{chaser_name} strikes at the fleeing {runner_name}."));
        self.strike(chaser_side, BASIC_ATTACK_POWER, DamageSchool::Physical, false, rng);
        if !self.state.is_terminal() {
            self.end_turn(chaser_side, None);
        }
        false
    }
}
