//! State identities.
//!
//! Two kinds of handle name a state. `StateId` is the application's
//! identity, unique only among the children of one enclosing state and used
//! for the enclosing composite's active-child bookkeeping. `NodeId` is the
//! arena address of a state inside a built hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-chosen identity of a state within its enclosing state.
///
/// Identities are never used to allocate or look up states globally; two
/// states in different composites may share the same value.
///
/// # Example
///
/// ```rust
/// use strata::StateId;
///
/// let idle = StateId::new(1);
/// assert_eq!(idle.value(), 1);
/// assert_eq!(StateId::from(1u32), idle);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Identity carried by the top state.
    pub const TOP: Self = Self(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for StateId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of a state node inside a `Hierarchy`.
///
/// Handed out by `HierarchyBuilder` while the hierarchy is assembled and
/// stable for the hierarchy's whole lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root of every hierarchy.
    pub const TOP: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}
