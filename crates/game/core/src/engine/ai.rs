//! Opponent decision making.

use crate::action::CombatAction;
use crate::config::CombatConfig;
use crate::env::RandomSource;
use crate::state::Combatant;

/// Picks the next action for an automatically controlled combatant.
///
/// One roll is always drawn. Below `ai_ability_chance`, and with at least one
/// ability off cooldown, a second roll picks uniformly among the ready
/// abilities; otherwise the combatant attacks. The result is a pure function
/// of the combatant and the rolls, so a fixed source replays the same choice.
pub fn choose_action<R>(actor: &Combatant, config: &CombatConfig, rng: &mut R) -> CombatAction
where
    R: RandomSource + ?Sized,
{
    let roll = rng.next_f64();
    let ready = actor.ready_abilities();

    if roll < config.ai_ability_chance && !ready.is_empty() {
        let pick = ready[rng.index(ready.len())];
        CombatAction::UseAbility(pick.id.clone())
    } else {
        CombatAction::Attack
    }
}
