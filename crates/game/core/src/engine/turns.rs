//! Turn bookkeeping: initiative, end-of-turn processing and automatic turns.

use crate::effect::{EffectPayload, TickContext, TickReport};
use crate::env::RandomSource;
use crate::state::{CombatEvent, CombatState, Combatant, RemovalReason, RewardTrigger, Side};

use super::{CombatSession, ENRAGE_AURA, ai};

impl CombatSession {
    /// Rolls initiative for both sides (player first). Ties go to the player.
    ///
    /// # Formula
    ///
    /// ```text
    /// score = speed + modifier speed + uniform(0, initiative_jitter)
    /// ```
    pub(super) fn roll_initiative<R>(&self, rng: &mut R) -> [Side; 2]
    where
        R: RandomSource + ?Sized,
    {
        let jitter = self.config.initiative_jitter.max(0.0);
        let player = initiative_score(&self.player, jitter, rng);
        let opponent = initiative_score(&self.opponent, jitter, rng);
        tracing::debug!(player, opponent, "initiative rolled");

        if opponent > player {
            [Side::Opponent, Side::Player]
        } else {
            [Side::Player, Side::Opponent]
        }
    }

    /// Closes `side`'s turn: cooldowns, effect ticks, then hands control over.
    pub(super) fn end_turn(&mut self, side: Side, used_ability: Option<&str>) {
        let combatant = self.combatant_mut(side);
        combatant.tick_cooldowns(used_ability);
        let context = TickContext {
            max_hp: combatant.max_health,
        };
        let report = combatant.effects.tick(context);

        self.apply_tick(side, &report);
        if self.state.is_terminal() {
            return;
        }
        self.advance(side);
    }

    fn apply_tick(&mut self, side: Side, report: &TickReport) {
        let name = self.combatant(side).name.clone();

        for entry in &report.per_effect {
            let label = self.effect_name(side, &entry.id);
            if entry.damage > 0 {
                self.narrate(format!("{name} takes {} damage from {label}.", entry.damage));
            }
            if entry.heal > 0 {
                self.narrate(format!("{name} recovers {} health from {label}.", entry.heal));
            }
        }

        // Damage and healing of one tick net out before touching health.
        if report.total_damage > report.total_heal {
            let lost = self
                .combatant_mut(side)
                .take_damage(report.total_damage - report.total_heal);
            self.emit(CombatEvent::Damaged {
                target: side,
                amount: lost,
                critical: false,
                source: "effects".into(),
            });
        } else if report.total_heal > report.total_damage {
            let gained = self
                .combatant_mut(side)
                .heal(report.total_heal - report.total_damage);
            self.emit(CombatEvent::Healed {
                target: side,
                amount: gained,
                source: "effects".into(),
            });
        }

        if !report.expired.is_empty() {
            for id in &report.expired {
                let label = self.effect_name(side, id);
                self.narrate(format!("{name}'s {label} wears off."));
            }
            self.emit(CombatEvent::EffectsRemoved {
                target: side,
                effects: report.expired.clone(),
                reason: RemovalReason::Expired,
            });
        }

        self.after_health_change(side);
    }

    fn advance(&mut self, side: Side) {
        let next = side.other();
        self.current_actor = next;
        if next == self.turn_order[0] {
            self.turn += 1;
        }
    }

    /// Plays every turn that needs no input: opponent turns and turns of a
    /// stunned combatant. Stops when the player can act, the fight ends, or
    /// `max_automatic_turns` is spent.
    pub(super) fn run_automatic_turns<R>(&mut self, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let mut budget = self.config.max_automatic_turns;

        while !self.state.is_terminal() {
            let actor = self.current_actor;
            let stunned = self.combatant(actor).effects.is_incapacitated();
            if actor == Side::Player && !stunned {
                break;
            }
            if budget == 0 {
                tracing::warn!(
                    %actor,
                    turn = self.turn,
                    "automatic turn limit reached; waiting for input"
                );
                break;
            }
            budget -= 1;

            if stunned {
                self.skip_turn(actor);
            } else {
                let action = ai::choose_action(self.combatant(actor), &self.config, rng);
                tracing::debug!(%actor, action = action.as_ref(), turn = self.turn, "automatic action");
                self.execute(actor, &action, rng);
            }
        }
    }

    /// Passes the turn of an incapacitated combatant.
    pub(super) fn skip_turn(&mut self, side: Side) {
        let name = self.combatant(side).name.clone();
        self.narrate(format!("{name} is stunned and cannot act."));
        self.emit(CombatEvent::TurnSkipped { side });
        self.end_turn(side, None);
    }

    // ========================================================================
    // Health thresholds
    // ========================================================================

    /// Runs the checks that follow any health change on `side`.
    pub(super) fn after_health_change(&mut self, side: Side) {
        if self.combatant(side).is_defeated() {
            let outcome = match side {
                Side::Opponent => CombatState::Victory,
                Side::Player => CombatState::Defeat,
            };
            self.conclude(outcome);
        } else {
            self.check_enrage(side);
        }
    }

    fn check_enrage(&mut self, side: Side) {
        let threshold = self.config.enrage_threshold;
        let combatant = self.combatant(side);
        if !combatant.is_boss()
            || combatant.effects.has_effect(ENRAGE_AURA)
            || combatant.health_fraction() > threshold
        {
            return;
        }

        let mut payload = EffectPayload::new();
        payload.damage_pct = self.config.enrage_damage_pct;

        let combatant = self.combatant_mut(side);
        combatant.effects.add_aura(ENRAGE_AURA, "Enraged", payload);
        let name = combatant.name.clone();

        tracing::info!(%side, %name, "boss enraged");
        self.narrate(format!("{name} becomes ENRAGED!"));
        self.emit(CombatEvent::Enraged { side });
    }

    /// Moves the session into a terminal state. Later calls are ignored.
    pub(super) fn conclude(&mut self, outcome: CombatState) {
        if self.state.is_terminal() || !outcome.is_terminal() {
            return;
        }
        self.state = outcome;

        match outcome {
            CombatState::Victory => {
                let defeated = &self.opponent;
                self.reward = Some(RewardTrigger {
                    defeated_id: defeated.id.clone(),
                    defeated_name: defeated.name.clone(),
                    tier: defeated.tier,
                    turn: self.turn,
                });
                let message = format!("{} is defeated!", defeated.name);
                self.narrate(message);
            }
            CombatState::Defeat => {
                let message = format!("{} has fallen.", self.player.name);
                self.narrate(message);
            }
            CombatState::Fled | CombatState::InCombat => {}
        }

        self.emit(CombatEvent::Ended { state: outcome });
        tracing::info!(state = %outcome, turn = self.turn, "combat ended");
    }
}

fn initiative_score<R>(combatant: &Combatant, jitter: f64, rng: &mut R) -> f64
where
    R: RandomSource + ?Sized,
{
    combatant.modifiers().speed(combatant.attributes.speed) + rng.uniform(0.0, jitter)
}
