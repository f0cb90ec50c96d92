//! Loot collaborator contract.
//!
//! The session only reports *who* was defeated. Turning that into rewards is
//! the host's business, behind [`LootProducer`].
use combat_core::{RewardTrigger, Tier};

/// Rewards granted for one victory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loot {
    pub experience: u32,
    pub gold: u32,
    pub items: Vec<String>,
}

impl Loot {
    pub fn new(experience: u32, gold: u32) -> Self {
        Self {
            experience,
            gold,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }
}

/// Converts a defeated opponent into rewards.
///
/// Called at most once per encounter by the registry.
pub trait LootProducer: Send + Sync {
    fn produce(&self, trigger: &RewardTrigger) -> Loot;
}

/// Fixed rewards per opponent tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierLootTable {
    pub normal: Loot,
    pub elite: Loot,
    pub boss: Loot,
}

impl Default for TierLootTable {
    fn default() -> Self {
        Self {
            normal: Loot::new(10, 2),
            elite: Loot::new(25, 6),
            boss: Loot::new(100, 25).with_item("boss_chest"),
        }
    }
}

impl LootProducer for TierLootTable {
    fn produce(&self, trigger: &RewardTrigger) -> Loot {
        match trigger.tier {
            Tier::Normal => self.normal.clone(),
            Tier::Elite => self.elite.clone(),
            Tier::Boss => self.boss.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(tier: Tier) -> RewardTrigger {
        RewardTrigger {
            defeated_id: "ogre".into(),
            defeated_name: "Ogre".into(),
            tier,
            turn: 4,
        }
    }

    #[test]
    fn rewards_scale_with_tier() {
        let table = TierLootTable::default();
        let normal = table.produce(&trigger(Tier::Normal));
        let boss = table.produce(&trigger(Tier::Boss));

        assert!(boss.experience > normal.experience);
        assert_eq!(boss.items, vec!["boss_chest".to_string()]);
        assert!(normal.items.is_empty());
    }
}
