//! Combat participants and the views a session hands back.
//!
//! [`Combatant`] is owned by the session while a fight runs; callers read it
//! through [`CombatantSnapshot`] inside each [`CombatReport`].
mod combatant;
mod report;

pub use combatant::{
    AbilitySlot, Attributes, Combatant, CombatantBuilder, OnHitEffect, Side, Tier,
};
pub use report::{
    CombatEvent, CombatReport, CombatState, CombatantSnapshot, CooldownView, LogEntry,
    RemovalReason, RewardTrigger,
};
