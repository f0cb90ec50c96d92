//! Deterministic turn-based combat rules.
//!
//! `combat-core` holds the status-effect rules engine ([`effect`]), the
//! damage and escape formulas ([`combat`]) and the session state machine
//! ([`engine::CombatSession`]) that ties them together. It performs no I/O:
//! effect definitions arrive through an [`EffectCatalog`] and randomness
//! through a [`RandomSource`], both injected by the caller.
pub mod action;
pub mod combat;
pub mod config;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{Ability, ActionEffect, CombatAction, CombatItem, EffectTarget};
pub use combat::{DamageRoll, DamageSchool, ElementalAffinity, HitCheck};
pub use config::CombatConfig;
pub use effect::{
    ActiveEffect, AggregatedModifiers, ApplyAction, ApplyOutcome, ApplyOverrides, ApplyRejection,
    Aura, BreakTrigger, CleanseOptions, ComboRule, ComboTrigger, EffectCategory, EffectDuration,
    EffectFlags, EffectId, EffectPayload, EffectTemplate, EffectTrack, Immunities, RemovalError,
    ResistanceRule, StatBonuses, TickContext, TickReport,
};
pub use engine::{CombatError, CombatSession, ENRAGE_AURA};
pub use env::{
    CatalogError, EffectCatalog, PcgRng, RandomSource, SequenceRng, StaticCatalog,
    StaticCatalogBuilder,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    AbilitySlot, Attributes, CombatEvent, CombatReport, CombatState, Combatant, CombatantBuilder,
    CombatantSnapshot, LogEntry, OnHitEffect, RemovalReason, RewardTrigger, Side, Tier,
};
