//! Rule-engine rejections.
//!
//! These are not failures of the engine: a rejected application or removal is
//! a no-op the caller reports back to whoever asked for it.

use crate::error::{ErrorSeverity, GameError};

use super::template::EffectId;

/// Why [`EffectTrack::apply`](super::EffectTrack::apply) refused an effect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplyRejection {
    /// No template with this id exists in the catalog.
    #[error("unknown effect '{0}'")]
    UnknownEffect(EffectId),

    /// An active effect or aura grants immunity to it.
    #[error("immune to '{effect}' (granted by '{granted_by}')")]
    Immune {
        effect: EffectId,
        granted_by: EffectId,
    },

    /// A resistance rule counters it while another effect is active.
    #[error("'{effect}' is countered by active '{countered_by}'")]
    Countered {
        effect: EffectId,
        countered_by: EffectId,
    },

    /// The existing instance cannot be stacked or refreshed.
    #[error("'{0}' cannot be modified")]
    CannotModify(EffectId),
}

impl ApplyRejection {
    pub fn effect(&self) -> &EffectId {
        match self {
            Self::UnknownEffect(id) | Self::CannotModify(id) => id,
            Self::Immune { effect, .. } | Self::Countered { effect, .. } => effect,
        }
    }
}

impl GameError for ApplyRejection {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEffect(_) => ErrorSeverity::Validation,
            Self::Immune { .. } | Self::Countered { .. } | Self::CannotModify(_) => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEffect(_) => "unknown_effect",
            Self::Immune { .. } => "immune",
            Self::Countered { .. } => "countered",
            Self::CannotModify(_) => "cannot_modify",
        }
    }
}

/// Why a removal (cleanse, dispel, explicit remove) did not happen.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalError {
    #[error("effect '{0}' is not active")]
    NotFound(EffectId),

    #[error("effect '{0}' cannot be removed")]
    CannotRemove(EffectId),
}

impl GameError for RemovalError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::CannotRemove(_) => "cannot_remove",
        }
    }
}
