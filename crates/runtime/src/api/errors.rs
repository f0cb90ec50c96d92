//! Unified error type surfaced by the encounter registry.
//!
//! Wraps rejected combat actions and repository failures so hosts can bubble
//! them up with the player they concern.
use std::time::Duration;

use combat_core::{CombatError, ErrorSeverity, GameError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, EncounterError>;

#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("player {0} has no active encounter")]
    NotFound(String),

    #[error("player {0} is already in an encounter")]
    AlreadyInEncounter(String),

    #[error("no stored combatant for player {0}")]
    UnknownPlayer(String),

    #[error("encounter for player {player} expired after {elapsed:?}")]
    Expired { player: String, elapsed: Duration },

    #[error("encounter lock was poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GameError for EncounterError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Combat(err) => err.severity(),
            Self::NotFound(_) | Self::AlreadyInEncounter(_) | Self::UnknownPlayer(_) => {
                ErrorSeverity::Validation
            }
            Self::Expired { .. } => ErrorSeverity::Recoverable,
            Self::LockPoisoned | Self::Repository(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "encounter_not_found",
            Self::AlreadyInEncounter(_) => "already_in_encounter",
            Self::UnknownPlayer(_) => "unknown_player",
            Self::Expired { .. } => "encounter_expired",
            Self::LockPoisoned => "lock_poisoned",
            Self::Combat(err) => err.error_code(),
            Self::Repository(_) => "repository",
        }
    }
}

#[cfg(test)]
mod tests {
    use combat_core::Side;

    use super::*;

    #[test]
    fn combat_errors_keep_their_classification() {
        let err = EncounterError::from(CombatError::NotYourTurn {
            side: Side::Player,
            current: Side::Opponent,
        });
        assert_eq!(err.error_code(), "not_your_turn");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn expiry_is_recoverable() {
        let err = EncounterError::Expired {
            player: "alice".into(),
            elapsed: Duration::from_secs(601),
        };
        assert!(err.severity().is_recoverable());
        assert!(err.to_string().contains("alice"));
    }
}
