//! Status-effect rules engine.
//!
//! - [`template`]: immutable effect definitions and their payloads
//! - [`rules`]: combo and resistance rules
//! - [`active`]: runtime instances (timed effects and permanent auras)
//! - [`modifiers`]: folding everything active into one modifier set
//! - [`track`]: the per-combatant collection and its operations

pub mod active;
pub mod error;
pub mod modifiers;
pub mod rules;
pub mod template;
pub mod track;

pub use active::{ActiveEffect, Aura};
pub use error::{ApplyRejection, RemovalError};
pub use modifiers::AggregatedModifiers;
pub use rules::{ComboRule, ResistanceRule};
pub use template::{
    EffectCategory, EffectDuration, EffectFlags, EffectId, EffectPayload, EffectTemplate,
    Immunities, StatBonuses,
};
pub use track::{
    ApplyAction, ApplyOutcome, ApplyOverrides, BreakTrigger, CleanseOptions, ComboTrigger,
    EffectTrack, TickContext, TickEntry, TickReport,
};
