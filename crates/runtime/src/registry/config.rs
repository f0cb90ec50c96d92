use std::time::Duration;

use combat_core::CombatConfig;

/// Settings for an [`EncounterRegistry`](super::EncounterRegistry).
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryConfig {
    /// Rules every hosted session plays by.
    pub combat: CombatConfig,

    /// Wall-clock cap measured from `begin`. `None` disables expiry.
    pub encounter_time_limit: Option<Duration>,
}

impl RegistryConfig {
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10 * 60);

    pub fn new(combat: CombatConfig) -> Self {
        Self {
            combat,
            encounter_time_limit: Some(Self::DEFAULT_TIME_LIMIT),
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.encounter_time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn without_time_limit(mut self) -> Self {
        self.encounter_time_limit = None;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}
