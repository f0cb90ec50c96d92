//! Repository contracts for loading players and recording fight results.

use std::sync::Arc;

use combat_core::{
    Ability, Attributes, CombatItem, CombatState, Combatant, EffectCatalog, Side,
};

use super::error::Result;

/// Persisted base stats for a player combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub max_health: u32,
    pub health: u32,
    pub attributes: Attributes,
    pub abilities: Vec<Ability>,
    pub items: Vec<CombatItem>,
}

impl PlayerRecord {
    /// A record at full health with no abilities or items.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        max_health: u32,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_health,
            health: max_health,
            attributes,
            abilities: Vec::new(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: CombatItem) -> Self {
        self.items.push(item);
        self
    }

    /// Builds the player's side of a fight. Cooldowns always start ready.
    pub fn to_combatant(&self, catalog: Arc<dyn EffectCatalog>) -> Combatant {
        let mut builder = Combatant::builder(self.id.clone(), self.name.clone(), catalog)
            .side(Side::Player)
            .max_health(self.max_health)
            .health(self.health)
            .attributes(self.attributes);
        for ability in &self.abilities {
            builder = builder.ability(ability.clone());
        }
        for item in &self.items {
            builder = builder.item(item.clone());
        }
        builder.build()
    }
}

/// What a finished encounter left behind for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterOutcome {
    pub player_id: String,
    pub opponent_id: String,
    pub state: CombatState,
    pub turn: u32,
    pub remaining_health: u32,
    pub remaining_items: Vec<CombatItem>,
}

/// Repository for player combatants.
///
/// Implementations must be shareable across the registry's worker threads.
pub trait CombatantRepository: Send + Sync {
    /// Load a player's base stats. `None` when the player is unknown.
    fn load_player(&self, player_id: &str) -> Result<Option<PlayerRecord>>;

    /// Persist the result of a finished encounter.
    fn record_outcome(&self, outcome: &EncounterOutcome) -> Result<()>;
}
