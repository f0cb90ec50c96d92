//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (`ApplyRejection`, `RemovalError`, `CombatError`)
//! live beside the operations that produce them. This module provides the
//! shared classification every one of them implements.
//!
//! # Design Principles
//!
//! - **Type Safety**: each operation family has its own error enum
//! - **No Mutation on Error**: a returned error guarantees state is untouched
//! - **Severity Classification**: rule-engine no-ops are distinguished from
//!   caller mistakes and from engine defects

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: a rule said "no" (immunity, counter, cannot remove);
///   report it as a no-op to whoever initiated the request
/// - **Validation**: the caller broke a precondition (out of turn, unknown id)
/// - **Internal**: the engine reached a state it should never reach
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Rule-engine rejection. Nothing changed, nothing is broken.
    ///
    /// Examples: target immune, effect countered, effect cannot be removed
    Recoverable,

    /// Invalid request, should not retry without changes.
    ///
    /// Examples: acting out of turn, unknown ability, combat already over
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is a rule-engine no-op.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on who is at fault, not on impact
/// - `error_code` must be a stable snake_case identifier usable as a reason
///   code in result envelopes
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
