//! Host-side orchestration for combat sessions.
//!
//! `combat-core` resolves fights but owns no clock, no storage and no loot
//! tables. This crate supplies those edges for a multi-threaded host:
//!
//! - [`registry`] keeps one locked [`CombatSession`](combat_core::CombatSession)
//!   per player, enforces the encounter time limit and settles rewards once
//! - [`api`] exposes the error type and the loot collaborator contract
//! - [`repository`] loads player base stats and records encounter outcomes
//! - [`rng`] adapts `rand_chacha` to [`RandomSource`](combat_core::RandomSource)
//! - [`telemetry`] installs the tracing subscriber
pub mod api;
pub mod registry;
pub mod repository;
pub mod rng;
pub mod telemetry;

pub use api::{EncounterError, Loot, LootProducer, Result, TierLootTable};
pub use registry::{EncounterRegistry, EncounterUpdate, RegistryConfig};
pub use repository::{
    CombatantRepository, EncounterOutcome, InMemoryCombatantRepo, PlayerRecord, RepositoryError,
};
pub use rng::ChaChaSource;
