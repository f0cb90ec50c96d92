//! What a session reports back after each action.

use crate::combat::HitCheck;
use crate::effect::{ActiveEffect, ApplyAction, ApplyRejection, EffectId};

use super::{Combatant, Side, Tier};

/// Lifecycle of a session. Every state other than `InCombat` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatState {
    #[default]
    InCombat,
    /// The opponent was defeated.
    Victory,
    /// The player was defeated.
    Defeat,
    /// The player escaped.
    Fled,
}

impl CombatState {
    pub fn is_terminal(self) -> bool {
        self != Self::InCombat
    }
}

/// One human-readable line of the combat log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub turn: u32,
    pub message: String,
}

/// Emitted once when the opponent is defeated. The orchestrator turns it into
/// loot; the session never grants rewards itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardTrigger {
    pub defeated_id: String,
    pub defeated_name: String,
    pub tier: Tier,
    pub turn: u32,
}

/// Why effects left a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RemovalReason {
    Expired,
    Cleansed,
    Dispelled,
    Broken,
}

/// Structured counterpart of the log, for callers that render their own text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombatEvent {
    InitiativeRolled {
        order: [Side; 2],
    },
    TurnSkipped {
        side: Side,
    },
    Missed {
        attacker: Side,
        check: HitCheck,
    },
    Damaged {
        target: Side,
        amount: u32,
        critical: bool,
        source: String,
    },
    Healed {
        target: Side,
        amount: u32,
        source: String,
    },
    EffectApplied {
        target: Side,
        effect: EffectId,
        action: ApplyAction,
        stacks: u8,
    },
    EffectRejected {
        target: Side,
        reason: ApplyRejection,
    },
    ComboTriggered {
        target: Side,
        rule: String,
        consumed: Vec<EffectId>,
        result: EffectId,
    },
    EffectsRemoved {
        target: Side,
        effects: Vec<EffectId>,
        reason: RemovalReason,
    },
    Enraged {
        side: Side,
    },
    FleeAttempted {
        chance_pct: u32,
        escaped: bool,
    },
    Ended {
        state: CombatState,
    },
}

/// Cooldown of one ability, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownView {
    pub ability: String,
    pub remaining: u32,
}

/// Read-only view of a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSnapshot {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub tier: Tier,
    pub health: u32,
    pub max_health: u32,
    pub effects: Vec<ActiveEffect>,
    pub auras: Vec<EffectId>,
    pub cooldowns: Vec<CooldownView>,
}

impl From<&Combatant> for CombatantSnapshot {
    fn from(combatant: &Combatant) -> Self {
        Self {
            id: combatant.id.clone(),
            name: combatant.name.clone(),
            side: combatant.side,
            tier: combatant.tier,
            health: combatant.health,
            max_health: combatant.max_health,
            effects: combatant.effects.active_effects().to_vec(),
            auras: combatant
                .effects
                .active_auras()
                .iter()
                .map(|aura| aura.id.clone())
                .collect(),
            cooldowns: combatant
                .abilities
                .iter()
                .map(|slot| CooldownView {
                    ability: slot.ability.id.clone(),
                    remaining: slot.cooldown_remaining,
                })
                .collect(),
        }
    }
}

/// Result of one accepted action: the full session view plus what just
/// happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatReport {
    /// False for a failed escape or a player attack that did not connect.
    pub success: bool,
    pub state: CombatState,
    pub turn: u32,
    pub current_actor: Side,
    pub player: CombatantSnapshot,
    pub opponent: CombatantSnapshot,
    /// Entire log since the session started.
    pub log: Vec<LogEntry>,
    pub reward: Option<RewardTrigger>,
    /// Events produced by this call only.
    pub events: Vec<CombatEvent>,
}

impl CombatReport {
    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(|entry| entry.message.as_str())
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::CombatConfig;
    use crate::engine::CombatSession;
    use crate::env::{SequenceRng, StaticCatalog};

    #[test]
    fn report_survives_json() {
        let catalog = Arc::new(StaticCatalog::empty());
        let hero = Combatant::builder("hero", "Hero", catalog.clone())
            .max_health(50)
            .attack(10)
            .speed(5)
            .build();
        let rat = Combatant::builder("rat", "Rat", catalog)
            .max_health(20)
            .attack(3)
            .build();

        let mut rng = SequenceRng::constant(0.5);
        let mut session = CombatSession::start(hero, rat, CombatConfig::default(), &mut rng);
        let report = session.attack(&mut rng).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"in_combat\""));
        let back: CombatReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
