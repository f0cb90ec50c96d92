//! Runtime effect instances bound to one combatant.

use super::template::{EffectId, EffectPayload};

/// A temporary effect currently applied to a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: EffectId,
    /// Always in `1..=template.stack_limit()`.
    pub stacks: u8,
    /// Turns left; `None` for templates that last until cleansed.
    pub remaining: Option<u32>,
    /// Who or what applied it, for log attribution.
    pub source: Option<String>,
    /// Logical creation stamp from the owning track's clock.
    pub applied_at: u64,
}

impl ActiveEffect {
    pub fn is_expired(&self) -> bool {
        self.remaining == Some(0)
    }

    /// True if the effect counts down (not an until-cleansed instance).
    pub fn is_timed(&self) -> bool {
        self.remaining.is_some()
    }
}

/// A permanent effect. No duration; survives bulk clears that keep auras.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aura {
    pub id: EffectId,
    pub name: String,
    pub payload: EffectPayload,
}

impl Aura {
    pub fn new(id: impl Into<EffectId>, name: impl Into<String>, payload: EffectPayload) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payload,
        }
    }
}
