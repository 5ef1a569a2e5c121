//! Snapshot and restore of a hierarchy's configuration.
//!
//! A snapshot records which states are active, every composite's
//! active-child slot and the entry statistics. Behaviours and the shared
//! environment are not part of it; restoring requires a hierarchy built
//! from the same assembly code.

use crate::core::{EntryStats, NodeId, StateId};
use crate::hierarchy::tree::Tree;
use crate::hierarchy::{Hierarchy, StateKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Recorded condition of one state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Path of the state, used to match it on restore
    pub path: String,

    /// Whether the state was part of the configuration
    pub active: bool,

    /// Active-child slot (composites only)
    pub slot: Option<StateId>,

    pub stats: EntryStats,
}

/// Serializable snapshot of a hierarchy's configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// One entry per state, in arena order
    pub states: Vec<StateSnapshot>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}

impl<E, Ctx> Hierarchy<E, Ctx> {
    /// Capture the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        let states = self
            .tree
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| StateSnapshot {
                path: node.path.clone(),
                active: node.active,
                slot: self.tree.slot(NodeId(index)),
                stats: node.stats.clone(),
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            states,
        }
    }

    /// Replace the current configuration with a snapshot's.
    ///
    /// The snapshot must list the same states in the same order, and its
    /// active flags must form a valid configuration: active states sit under
    /// active parents, an active composite's slot names its only active
    /// child, and an active parallel state has every region active. On any
    /// failure the hierarchy is left untouched.
    ///
    /// A slot naming no known child under a composite with no active child
    /// is accepted; it surfaces as `HsmError::InvalidActiveState` on the next
    /// dispatch.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CheckpointError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        if snapshot.states.len() != self.tree.nodes.len() {
            return Err(CheckpointError::ShapeMismatch(format!(
                "expected {} states, found {}",
                self.tree.nodes.len(),
                snapshot.states.len()
            )));
        }

        if let Some((node, recorded)) = self
            .tree
            .nodes
            .iter()
            .zip(&snapshot.states)
            .find(|(node, recorded)| node.path != recorded.path)
        {
            return Err(CheckpointError::ShapeMismatch(format!(
                "expected state '{}', found '{}'",
                node.path, recorded.path
            )));
        }

        let previous = self.tree.nodes.clone();
        for (index, recorded) in snapshot.states.iter().enumerate() {
            // Top stays active whatever the snapshot claims.
            self.tree.nodes[index].active = index == 0 || recorded.active;
            self.tree.nodes[index].stats = recorded.stats.clone();
            self.tree.set_slot(NodeId(index), recorded.slot);
        }

        if let Err(reason) = check_configuration(&self.tree) {
            self.tree.nodes = previous;
            warn!(snapshot = %snapshot.id, %reason, "rejected snapshot");
            return Err(CheckpointError::InconsistentConfiguration(reason));
        }

        debug!(snapshot = %snapshot.id, "restored snapshot");
        Ok(())
    }
}

fn check_configuration(tree: &Tree) -> Result<(), String> {
    for (index, node) in tree.nodes.iter().enumerate() {
        if !node.active {
            continue;
        }
        let id = NodeId(index);

        if let Some(parent) = node.parent {
            if !tree.node(parent).active {
                return Err(format!(
                    "'{}' is active under inactive '{}'",
                    node.path,
                    tree.node(parent).path
                ));
            }
        }

        match node.kind.state_kind() {
            StateKind::Simple => {}
            StateKind::Composite => {
                let mut active = tree
                    .children(id)
                    .iter()
                    .copied()
                    .filter(|child| tree.node(*child).active);
                match (active.next(), active.next()) {
                    (Some(first), Some(second)) => {
                        return Err(format!(
                            "'{}' has more than one active child ('{}', '{}')",
                            node.path,
                            tree.node(first).path,
                            tree.node(second).path
                        ));
                    }
                    (Some(child), None) if tree.active_child(id) != Some(child) => {
                        return Err(format!(
                            "slot of '{}' does not name its active child '{}'",
                            node.path,
                            tree.node(child).path
                        ));
                    }
                    (None, _) => {
                        if let Some(child) = tree.active_child(id) {
                            return Err(format!(
                                "slot of '{}' names inactive '{}'",
                                node.path,
                                tree.node(child).path
                            ));
                        }
                    }
                    _ => {}
                }
            }
            StateKind::Parallel => {
                if let Some(region) = tree
                    .children(id)
                    .iter()
                    .find(|region| !tree.node(**region).active)
                {
                    return Err(format!(
                        "region '{}' of active '{}' is inactive",
                        tree.node(*region).path,
                        node.path
                    ));
                }
            }
        }
    }
    Ok(())
}
