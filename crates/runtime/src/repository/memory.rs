use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::traits::{CombatantRepository, EncounterOutcome, PlayerRecord};

/// In-memory implementation of [`CombatantRepository`].
///
/// Recording an outcome writes the remaining health and items back onto the
/// stored player, so the next encounter starts where the last one ended.
#[derive(Debug, Default)]
pub struct InMemoryCombatantRepo {
    players: RwLock<HashMap<String, PlayerRecord>>,
    outcomes: RwLock<Vec<EncounterOutcome>>,
}

impl InMemoryCombatantRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with players.
    pub fn with_players(players: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let players = players
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            players: RwLock::new(players),
            outcomes: RwLock::default(),
        }
    }

    /// Insert or replace a player record.
    pub fn insert(&self, record: PlayerRecord) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players.insert(record.id.clone(), record);
        Ok(())
    }

    /// Every outcome recorded so far, oldest first.
    pub fn outcomes(&self) -> Result<Vec<EncounterOutcome>> {
        let outcomes = self
            .outcomes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(outcomes.clone())
    }
}

impl CombatantRepository for InMemoryCombatantRepo {
    fn load_player(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(player_id).cloned())
    }

    fn record_outcome(&self, outcome: &EncounterOutcome) -> Result<()> {
        {
            let mut players = self
                .players
                .write()
                .map_err(|_| RepositoryError::LockPoisoned)?;
            let record = players
                .get_mut(&outcome.player_id)
                .ok_or_else(|| RepositoryError::MissingRecord(outcome.player_id.clone()))?;
            record.health = outcome.remaining_health;
            record.items = outcome.remaining_items.clone();
        }

        self.outcomes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .push(outcome.clone());
        Ok(())
    }
}
