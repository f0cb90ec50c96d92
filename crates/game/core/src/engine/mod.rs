//! Turn-based combat session.
//!
//! [`CombatSession`] is the authoritative owner of one fight between a player
//! and an opponent. Every accepted action flows through the same pipeline:
//!
//! validate → resolve → end turn (cooldowns, effect ticks) → hand over
//!
//! Opponent turns, and any turn of a stunned combatant, run automatically
//! inside the call that hands control to them, so a caller only ever acts on
//! the player's behalf and gets back a [`CombatReport`] once control returns
//! (or the fight ends).
//!
//! Randomness is always injected. A rejected action returns a
//! [`CombatError`] and leaves the session untouched, including the random
//! source, which is never drawn from during validation.

mod ai;
mod errors;
mod transition;
mod turns;

pub use ai::choose_action;
pub use errors::CombatError;

use crate::action::CombatAction;
use crate::config::CombatConfig;
use crate::effect::EffectId;
use crate::env::RandomSource;
use crate::state::{
    CombatEvent, CombatReport, CombatState, Combatant, CombatantSnapshot, LogEntry, RewardTrigger,
    Side,
};

/// Aura granted to a boss that drops below the enrage threshold.
pub const ENRAGE_AURA: &str = "enraged";

/// One fight from first initiative roll to a terminal state.
#[derive(Clone, Debug)]
pub struct CombatSession {
    config: CombatConfig,
    player: Combatant,
    opponent: Combatant,
    /// Starts at 1; advances whenever play wraps back to `turn_order[0]`.
    turn: u32,
    turn_order: [Side; 2],
    current_actor: Side,
    state: CombatState,
    log: Vec<LogEntry>,
    reward: Option<RewardTrigger>,
    /// Events produced by the most recent call.
    events: Vec<CombatEvent>,
    last_success: bool,
}

impl CombatSession {
    /// Starts a fight: rolls initiative and, if the opponent wins it, plays
    /// the opponent's opening turn before returning.
    pub fn start<R>(
        mut player: Combatant,
        mut opponent: Combatant,
        config: CombatConfig,
        rng: &mut R,
    ) -> Self
    where
        R: RandomSource + ?Sized,
    {
        player.side = Side::Player;
        opponent.side = Side::Opponent;

        let mut session = Self {
            config,
            player,
            opponent,
            turn: 1,
            turn_order: [Side::Player, Side::Opponent],
            current_actor: Side::Player,
            state: CombatState::InCombat,
            log: Vec::new(),
            reward: None,
            events: Vec::new(),
            last_success: true,
        };

        let opening = format!(
            "{} encounters {}!",
            session.player.name, session.opponent.name
        );
        session.narrate(opening);

        let order = session.roll_initiative(rng);
        session.turn_order = order;
        session.current_actor = order[0];
        let first = session.combatant(order[0]).name.clone();
        session.narrate(format!("{first} acts first."));
        session.emit(CombatEvent::InitiativeRolled { order });

        tracing::info!(
            player = %session.player.id,
            opponent = %session.opponent.id,
            first = %order[0],
            "combat started"
        );

        for side in [Side::Player, Side::Opponent] {
            session.after_health_change(side);
        }
        session.run_automatic_turns(rng);
        session
    }

    /// Performs `action` on behalf of `side`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError`] without touching the session or `rng` when the
    /// fight is over, `side` is not the current actor, or the action's own
    /// preconditions fail.
    pub fn act<R>(
        &mut self,
        side: Side,
        action: CombatAction,
        rng: &mut R,
    ) -> Result<CombatReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.validate(side, &action)?;

        self.events.clear();
        tracing::debug!(%side, action = action.as_ref(), turn = self.turn, "action accepted");

        self.last_success = self.execute(side, &action, rng);
        self.run_automatic_turns(rng);
        Ok(self.report())
    }

    /// Basic attack by the player.
    pub fn attack<R>(&mut self, rng: &mut R) -> Result<CombatReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.act(Side::Player, CombatAction::Attack, rng)
    }

    pub fn use_ability<R>(&mut self, ability: &str, rng: &mut R) -> Result<CombatReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.act(Side::Player, CombatAction::ability(ability), rng)
    }

    pub fn use_item<R>(&mut self, item: &str, rng: &mut R) -> Result<CombatReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.act(Side::Player, CombatAction::item(item), rng)
    }

    pub fn flee<R>(&mut self, rng: &mut R) -> Result<CombatReport, CombatError>
    where
        R: RandomSource + ?Sized,
    {
        self.act(Side::Player, CombatAction::Flee, rng)
    }

    fn validate(&self, side: Side, action: &CombatAction) -> Result<(), CombatError> {
        if self.state.is_terminal() {
            return Err(CombatError::NotActive { state: self.state });
        }
        if side != self.current_actor {
            return Err(CombatError::NotYourTurn {
                side,
                current: self.current_actor,
            });
        }

        let actor = self.combatant(side);
        match action {
            CombatAction::Attack => Ok(()),
            CombatAction::UseAbility(id) => {
                let slot = actor
                    .ability(id)
                    .ok_or_else(|| CombatError::UnknownAbility(id.clone()))?;
                if slot.is_ready() {
                    Ok(())
                } else {
                    Err(CombatError::AbilityOnCooldown {
                        ability: id.clone(),
                        remaining: slot.cooldown_remaining,
                    })
                }
            }
            CombatAction::UseItem(id) => {
                let item = actor
                    .item(id)
                    .ok_or_else(|| CombatError::UnknownItem(id.clone()))?;
                if item.quantity == 0 {
                    Err(CombatError::ItemDepleted(id.clone()))
                } else {
                    Ok(())
                }
            }
            CombatAction::Flee => {
                let other = self.combatant(side.other());
                if other.is_boss() {
                    Err(CombatError::FleeBlocked {
                        opponent: other.name.clone(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Current view of the session, carrying the events of the latest call.
    pub fn report(&self) -> CombatReport {
        CombatReport {
            success: self.last_success,
            state: self.state,
            turn: self.turn,
            current_actor: self.current_actor,
            player: CombatantSnapshot::from(&self.player),
            opponent: CombatantSnapshot::from(&self.opponent),
            log: self.log.clone(),
            reward: self.reward.clone(),
            events: self.events.clone(),
        }
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn turn_order(&self) -> [Side; 2] {
        self.turn_order
    }

    pub fn current_actor(&self) -> Side {
        self.current_actor
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn opponent(&self) -> &Combatant {
        &self.opponent
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn reward(&self) -> Option<&RewardTrigger> {
        self.reward.as_ref()
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    fn narrate(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(turn = self.turn, %message);
        self.log.push(LogEntry {
            turn: self.turn,
            message,
        });
    }

    fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Display name of an effect, falling back to its id.
    fn effect_name(&self, side: Side, id: &EffectId) -> String {
        self.combatant(side)
            .effects
            .catalog()
            .template(id.as_str())
            .map_or_else(|| id.to_string(), |template| template.name.clone())
    }
}
