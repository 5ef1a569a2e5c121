//! Build errors for hierarchy assembly.

use crate::core::{NodeId, StateId};
use thiserror::Error;

/// Structural problems found while assembling a hierarchy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(id) before .build()")]
    MissingInitialState,

    #[error("State '{state}' refers to unknown enclosing {parent}")]
    UnknownParent { state: String, parent: NodeId },

    #[error("State '{state}' cannot be nested in simple state '{parent}'")]
    InvalidParent { state: String, parent: String },

    #[error("Region '{state}' of a parallel state must be a composite")]
    InvalidRegion { state: String },

    #[error("Duplicate state id {id} under '{parent}'")]
    DuplicateStateId { parent: String, id: StateId },

    #[error("Default child {default} of '{state}' is not one of its children")]
    UnknownDefaultChild { state: String, default: StateId },

    #[error("Parallel state '{state}' has no regions")]
    EmptyParallel { state: String },

    #[error("Iteration limit of '{state}' must be at least 1")]
    InvalidIterationLimit { state: String },

    #[error("Unknown state {node}")]
    UnknownNode { node: NodeId },

    #[error("The top state never transitions and takes no behavior")]
    TopBehavior,
}

/// Every problem found by a failed build.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid hierarchy: {}", join(.0))]
pub struct BuildErrors(pub(crate) Vec<BuildError>);

impl BuildErrors {
    pub fn errors(&self) -> &[BuildError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, error: &BuildError) -> bool {
        self.0.contains(error)
    }
}

fn join(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
