//! Public API surface shared by the registry and its collaborators.
mod errors;
mod loot;

pub use errors::{EncounterError, Result};
pub use loot::{Loot, LootProducer, TierLootTable};
