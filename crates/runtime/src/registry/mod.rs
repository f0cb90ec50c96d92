//! Encounter registry: one locked combat session per player.
//!
//! # Locking
//!
//! ```text
//! EncounterRegistry
//! └── encounters: RwLock<HashMap<player_id, Arc<Mutex<Encounter>>>>
//!                                             └── session + rng + start time
//! ```
//!
//! The map lock is only held long enough to clone or remove a handle; it is
//! never held while waiting on an encounter's mutex. Different players act in
//! parallel, and calls for the same player are serialized by its mutex.
mod config;

pub use config::RegistryConfig;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use combat_core::{
    CombatAction, CombatReport, CombatSession, Combatant, EffectCatalog, GameError, Side,
};

use crate::api::{EncounterError, Loot, LootProducer, Result};
use crate::repository::{CombatantRepository, EncounterOutcome};
use crate::rng::ChaChaSource;

/// Result of a registry call that drove a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncounterUpdate {
    pub report: CombatReport,
    /// Present only on the call that settled a victory.
    pub loot: Option<Loot>,
}

struct Encounter {
    session: CombatSession,
    rng: ChaChaSource,
    started_at: Instant,
    settled: bool,
}

type Handle = Arc<Mutex<Encounter>>;

/// Hosts live combat sessions for a multi-threaded orchestrator.
pub struct EncounterRegistry {
    config: RegistryConfig,
    catalog: Arc<dyn EffectCatalog>,
    repository: Arc<dyn CombatantRepository>,
    loot: Arc<dyn LootProducer>,
    encounters: RwLock<HashMap<String, Handle>>,
}

impl EncounterRegistry {
    pub fn new(
        config: RegistryConfig,
        catalog: Arc<dyn EffectCatalog>,
        repository: Arc<dyn CombatantRepository>,
        loot: Arc<dyn LootProducer>,
    ) -> Self {
        Self {
            config,
            catalog,
            repository,
            loot,
            encounters: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Starts a fight between a stored player and `opponent`.
    ///
    /// Every roll of the encounter comes from a ChaCha stream seeded with
    /// `seed`. If initiative hands the opening to the opponent and that turn
    /// already ends the fight, the encounter is settled before returning and
    /// never enters the registry. When that settlement fails the encounter is
    /// registered anyway so the next [`act`](Self::act) can retry it.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::AlreadyInEncounter`] if the player is mid-fight
    /// - [`EncounterError::UnknownPlayer`] if the repository has no record
    pub fn begin(&self, player_id: &str, opponent: Combatant, seed: u64) -> Result<EncounterUpdate> {
        if self.read_map()?.contains_key(player_id) {
            return Err(EncounterError::AlreadyInEncounter(player_id.to_owned()));
        }

        let record = self
            .repository
            .load_player(player_id)?
            .ok_or_else(|| EncounterError::UnknownPlayer(player_id.to_owned()))?;
        let player = record.to_combatant(Arc::clone(&self.catalog));

        let mut rng = ChaChaSource::seeded(seed);
        let session = CombatSession::start(player, opponent, self.config.combat.clone(), &mut rng);
        tracing::info!(
            player = player_id,
            opponent = %session.opponent().id,
            seed,
            "encounter started"
        );

        let mut encounter = Encounter {
            session,
            rng,
            started_at: Instant::now(),
            settled: false,
        };
        let report = encounter.session.report();

        let settled = if report.is_over() {
            match self.settle(player_id, &mut encounter) {
                Ok(loot) => return Ok(EncounterUpdate { report, loot }),
                Err(err) => Err(err),
            }
        } else {
            Ok(EncounterUpdate { report, loot: None })
        };

        match self.write_map()?.entry(player_id.to_owned()) {
            Entry::Occupied(_) => Err(EncounterError::AlreadyInEncounter(player_id.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(encounter)));
                settled
            }
        }
    }

    /// Submits a player action to the player's encounter.
    ///
    /// A terminal result is settled exactly once: the outcome is recorded,
    /// loot is produced for a victory, and the encounter leaves the registry.
    /// If recording fails the encounter stays registered, and the next call
    /// retries settlement and returns the final report without performing
    /// `action`.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::NotFound`] if the player has no encounter
    /// - [`EncounterError::Expired`] once the time limit has passed; the
    ///   encounter is discarded without recording an outcome
    /// - [`EncounterError::Combat`] if the session refused the action
    pub fn act(&self, player_id: &str, action: CombatAction) -> Result<EncounterUpdate> {
        let handle = self.handle(player_id)?;
        let mut encounter = handle.lock().map_err(|_| EncounterError::LockPoisoned)?;

        if encounter.session.is_over() {
            let report = encounter.session.report();
            return self.finish(player_id, &handle, encounter, report);
        }

        if let Some(limit) = self.config.encounter_time_limit {
            let elapsed = encounter.started_at.elapsed();
            if elapsed >= limit {
                drop(encounter);
                self.remove(player_id, &handle)?;
                tracing::warn!(player = player_id, ?elapsed, "encounter expired");
                return Err(EncounterError::Expired {
                    player: player_id.to_owned(),
                    elapsed,
                });
            }
        }

        let Encounter { session, rng, .. } = &mut *encounter;
        let report = session.act(Side::Player, action, rng).inspect_err(|err| {
            tracing::warn!(player = player_id, code = err.error_code(), "action rejected: {err}");
        })?;

        if !report.is_over() {
            return Ok(EncounterUpdate { report, loot: None });
        }

        self.finish(player_id, &handle, encounter, report)
    }

    /// Current report for a player's encounter.
    pub fn report(&self, player_id: &str) -> Result<CombatReport> {
        let handle = self.handle(player_id)?;
        let encounter = handle.lock().map_err(|_| EncounterError::LockPoisoned)?;
        Ok(encounter.session.report())
    }

    /// Drops a player's encounter without settling it.
    ///
    /// Returns `false` if the player had none.
    pub fn abandon(&self, player_id: &str) -> Result<bool> {
        let removed = self.write_map()?.remove(player_id).is_some();
        if removed {
            tracing::info!(player = player_id, "encounter abandoned");
        }
        Ok(removed)
    }

    /// Discards every encounter past the time limit, returning their players.
    ///
    /// Finished fights still waiting on settlement are kept.
    pub fn expire_stale(&self) -> Result<Vec<String>> {
        let Some(limit) = self.config.encounter_time_limit else {
            return Ok(Vec::new());
        };

        let handles: Vec<(String, Handle)> = self
            .read_map()?
            .iter()
            .map(|(player, handle)| (player.clone(), Arc::clone(handle)))
            .collect();

        let mut expired = Vec::new();
        for (player, handle) in handles {
            let stale = {
                let encounter = handle.lock().map_err(|_| EncounterError::LockPoisoned)?;
                !encounter.session.is_over() && encounter.started_at.elapsed() >= limit
            };
            if stale && self.remove(&player, &handle)? {
                tracing::warn!(player = %player, "encounter expired");
                expired.push(player);
            }
        }
        expired.sort();
        Ok(expired)
    }

    pub fn is_active(&self, player_id: &str) -> Result<bool> {
        Ok(self.read_map()?.contains_key(player_id))
    }

    pub fn active_count(&self) -> Result<usize> {
        Ok(self.read_map()?.len())
    }

    /// Settles a terminal encounter and drops it from the map.
    fn finish(
        &self,
        player_id: &str,
        handle: &Handle,
        mut encounter: MutexGuard<'_, Encounter>,
        report: CombatReport,
    ) -> Result<EncounterUpdate> {
        let loot = self.settle(player_id, &mut encounter)?;
        drop(encounter);
        self.remove(player_id, handle)?;
        Ok(EncounterUpdate { report, loot })
    }

    /// Records the outcome, then produces loot. `settled` is only set once
    /// both have happened, so a failed write can be retried without granting
    /// rewards twice.
    fn settle(&self, player_id: &str, encounter: &mut Encounter) -> Result<Option<Loot>> {
        if encounter.settled {
            return Ok(None);
        }

        let session = &encounter.session;
        let player = session.player();
        let outcome = EncounterOutcome {
            player_id: player_id.to_owned(),
            opponent_id: session.opponent().id.clone(),
            state: session.state(),
            turn: session.turn(),
            remaining_health: player.health,
            remaining_items: player.items().to_vec(),
        };
        self.repository.record_outcome(&outcome).inspect_err(|err| {
            tracing::warn!(player = player_id, "outcome not recorded: {err}");
        })?;

        let loot = session.reward().map(|trigger| self.loot.produce(trigger));
        encounter.settled = true;

        tracing::info!(
            player = player_id,
            state = %outcome.state,
            turn = outcome.turn,
            looted = loot.is_some(),
            "encounter settled"
        );
        Ok(loot)
    }

    fn handle(&self, player_id: &str) -> Result<Handle> {
        self.read_map()?
            .get(player_id)
            .cloned()
            .ok_or_else(|| EncounterError::NotFound(player_id.to_owned()))
    }

    /// Removes `handle` if it is still the player's registered encounter.
    fn remove(&self, player_id: &str, handle: &Handle) -> Result<bool> {
        let mut encounters = self.write_map()?;
        match encounters.get(player_id) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                encounters.remove(player_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn read_map(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Handle>>> {
        self.encounters.read().map_err(|_| EncounterError::LockPoisoned)
    }

    fn write_map(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Handle>>> {
        self.encounters.write().map_err(|_| EncounterError::LockPoisoned)
    }
}
