use crate::error::{ErrorSeverity, GameError};
use crate::state::{CombatState, Side};

/// Reasons an action is refused. A refused action never mutates the session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("combat is not active (state: {state})")]
    NotActive { state: CombatState },

    #[error("it is not {side}'s turn (current actor: {current})")]
    NotYourTurn { side: Side, current: Side },

    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("ability '{ability}' is on cooldown for {remaining} more turn(s)")]
    AbilityOnCooldown { ability: String, remaining: u32 },

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("no '{0}' left")]
    ItemDepleted(String),

    #[error("cannot flee from {opponent}")]
    FleeBlocked { opponent: String },
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotActive { .. } | Self::NotYourTurn { .. } => ErrorSeverity::Validation,
            Self::UnknownAbility(_) | Self::UnknownItem(_) => ErrorSeverity::Validation,
            Self::AbilityOnCooldown { .. } | Self::ItemDepleted(_) | Self::FleeBlocked { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotActive { .. } => "not_active",
            Self::NotYourTurn { .. } => "not_your_turn",
            Self::UnknownAbility(_) => "unknown_ability",
            Self::AbilityOnCooldown { .. } => "ability_on_cooldown",
            Self::UnknownItem(_) => "unknown_item",
            Self::ItemDepleted(_) => "item_depleted",
            Self::FleeBlocked { .. } => "flee_blocked",
        }
    }
}
