//! Fatal dispatch errors.

use crate::core::flags::TransFlags;
use crate::core::state::StateId;
use thiserror::Error;

/// Unrecoverable conditions raised while an event is dispatched.
///
/// Either variant aborts only the current `process` call. The driver decides
/// whether to keep running the hierarchy or shut it down.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HsmError {
    /// A composite's active-child slot named no known child, or a child
    /// reported `TransFlags::STATE_ERROR`. The slot has been reset.
    #[error("State '{state}' has invalid active child {active:?} (flags: {flags})")]
    InvalidActiveState {
        state: String,
        active: Option<StateId>,
        flags: TransFlags,
    },

    /// Completion transitions kept requesting re-evaluation.
    #[error("State '{state}' did not complete after {iterations} iterations (flags: {flags})")]
    RunToCompletionExceeded {
        state: String,
        iterations: usize,
        flags: TransFlags,
    },
}

impl HsmError {
    /// Path of the state that raised the error.
    pub fn state(&self) -> &str {
        match self {
            Self::InvalidActiveState { state, .. } => state,
            Self::RunToCompletionExceeded { state, .. } => state,
        }
    }

    /// Flags observed at the point of failure.
    pub fn flags(&self) -> TransFlags {
        match self {
            Self::InvalidActiveState { flags, .. } => *flags,
            Self::RunToCompletionExceeded { flags, .. } => *flags,
        }
    }
}
