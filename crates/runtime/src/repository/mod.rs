//! Repository layer for player data that outlives a single encounter.
//!
//! Repositories handle data that CHANGES between fights:
//! - Player base stats, abilities and consumables
//! - Encounter outcomes (remaining health, spent items)
//!
//! Monster construction belongs to the encounter orchestrator, not here.

mod error;
mod memory;
mod traits;

pub use error::RepositoryError;
pub use memory::InMemoryCombatantRepo;
pub use traits::{CombatantRepository, EncounterOutcome, PlayerRecord};
