//! The state arena and its entry/exit bookkeeping.
//!
//! The tree owns structural data only: identities, enclosing links,
//! active-child slots and statistics. Behaviours live beside it in the
//! `Hierarchy` so a running `trans` can borrow the tree mutably.

use crate::core::{EntryStats, NodeId, StateId, TransFlags};
use chrono::Utc;
use tracing::{trace, warn};

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Simple,
    Composite {
        default: StateId,
        active: Option<StateId>,
        children: Vec<NodeId>,
        max_iterations: usize,
    },
    Parallel {
        regions: Vec<NodeId>,
    },
}

impl NodeKind {
    pub(crate) fn state_kind(&self) -> StateKind {
        match self {
            Self::Simple => StateKind::Simple,
            Self::Composite { .. } => StateKind::Composite,
            Self::Parallel { .. } => StateKind::Parallel,
        }
    }
}

/// Kind of a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Leaf state
    Simple,
    /// Exactly one active child
    Composite,
    /// Every region active at once
    Parallel,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) active: bool,
    pub(crate) stats: EntryStats,
}

#[derive(Debug)]
pub(crate) struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) record_stats: bool,
}

impl Tree {
    pub(crate) fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node.0]
    }

    pub(crate) fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.node(node).kind {
            NodeKind::Simple => &[],
            NodeKind::Composite { children, .. } => children,
            NodeKind::Parallel { regions } => regions,
        }
    }

    pub(crate) fn child_by_id(&self, node: NodeId, id: StateId) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|child| self.node(*child).id == id)
    }

    pub(crate) fn slot(&self, node: NodeId) -> Option<StateId> {
        match &self.node(node).kind {
            NodeKind::Composite { active, .. } => *active,
            _ => None,
        }
    }

    pub(crate) fn set_slot(&mut self, node: NodeId, value: Option<StateId>) {
        if let NodeKind::Composite { active, .. } = &mut self.nodes[node.0].kind {
            *active = value;
        }
    }

    /// Child named by a composite's slot, if it resolves.
    pub(crate) fn active_child(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|id| self.child_by_id(node, id))
    }

    pub(crate) fn default_child(&self, node: NodeId) -> Option<NodeId> {
        match &self.node(node).kind {
            NodeKind::Composite { default, .. } => self.child_by_id(node, *default),
            _ => None,
        }
    }

    pub(crate) fn max_iterations(&self, node: NodeId) -> usize {
        match &self.node(node).kind {
            NodeKind::Composite { max_iterations, .. } => *max_iterations,
            _ => 0,
        }
    }

    pub(crate) fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.path == path)
            .map(NodeId)
    }

    /// Enter `target`, making the enclosing chain contiguous first.
    pub(crate) fn enter(&mut self, target: NodeId, prior: TransFlags) -> TransFlags {
        if target != NodeId::TOP {
            self.enter_node(target);
        }
        prior | TransFlags::RUN_TO_COMPLETE
    }

    fn enter_node(&mut self, target: NodeId) {
        let parent = self.node(target).parent;
        let mut freshly_enclosed = false;
        if let Some(parent) = parent {
            if !self.node(parent).active {
                self.enter_node(parent);
                freshly_enclosed = true;
            }
        }

        if self.node(target).active {
            // Regions come up together with their parallel state.
            if freshly_enclosed {
                return;
            }
            trace!(state = %self.node(target).path, "re-entering active state");
            self.exit_node(target);
        }

        if let Some(parent) = parent {
            self.claim_slot(parent, target);
        }
        self.activate(target);
    }

    fn claim_slot(&mut self, parent: NodeId, target: NodeId) {
        let id = self.node(target).id;
        let stale = match self.slot(parent) {
            Some(current) if current != id => self.child_by_id(parent, current),
            _ => None,
        };
        if let Some(sibling) = stale.filter(|s| self.node(*s).active) {
            warn!(
                state = %self.node(target).path,
                sibling = %self.node(sibling).path,
                "entering state while sibling is still active; exiting sibling"
            );
            self.exit_node(sibling);
        }
        self.set_slot(parent, Some(id));
    }

    fn activate(&mut self, node: NodeId) {
        let now = Utc::now();
        let record = self.record_stats;
        let entry = &mut self.nodes[node.0];
        entry.active = true;
        if record {
            entry.stats.record_entry(now);
        }
        trace!(state = %entry.path, "entered");

        if let NodeKind::Composite { active, .. } = &mut entry.kind {
            *active = None;
        }
        if entry.kind.state_kind() == StateKind::Parallel {
            for index in 0..self.children(node).len() {
                let region = self.children(node)[index];
                self.activate(region);
            }
        }
    }

    /// Exit `node` and everything active beneath it; returns the enclosing state.
    /// The top state never exits.
    pub(crate) fn exit(&mut self, node: NodeId) -> Option<NodeId> {
        if node == NodeId::TOP {
            return None;
        }
        self.exit_node(node)
    }

    /// Exit every active child of a composite, then clear its slot.
    pub(crate) fn reset_slot(&mut self, node: NodeId) {
        for index in 0..self.children(node).len() {
            let child = self.children(node)[index];
            if self.node(child).active {
                self.exit_node(child);
            }
        }
        self.set_slot(node, None);
    }

    fn exit_node(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node).parent;
        if !self.node(node).active {
            trace!(state = %self.node(node).path, "exit of inactive state ignored");
            return parent;
        }

        match self.node(node).kind.state_kind() {
            StateKind::Simple => {}
            StateKind::Composite => self.reset_slot(node),
            StateKind::Parallel => {
                for index in 0..self.children(node).len() {
                    let region = self.children(node)[index];
                    self.exit_node(region);
                }
            }
        }

        let now = Utc::now();
        let record = self.record_stats;
        let entry = &mut self.nodes[node.0];
        entry.active = false;
        if record {
            entry.stats.record_exit(now);
        }
        trace!(state = %entry.path, "exited");

        let id = entry.id;
        if let Some(parent) = parent {
            if self.slot(parent) == Some(id) {
                self.set_slot(parent, None);
            }
        }
        parent
    }

    /// Active states that have no active children, in dispatch order.
    pub(crate) fn active_leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(NodeId::TOP, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, node: NodeId, leaves: &mut Vec<NodeId>) {
        if !self.node(node).active {
            return;
        }
        match &self.node(node).kind {
            NodeKind::Simple => leaves.push(node),
            NodeKind::Composite { .. } => match self.active_child(node) {
                Some(child) if self.node(child).active => self.collect_leaves(child, leaves),
                _ => leaves.push(node),
            },
            NodeKind::Parallel { regions } => {
                for region in regions {
                    self.collect_leaves(*region, leaves);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: NodeId = NodeId::TOP;
    const A: NodeId = NodeId(1);
    const A1: NodeId = NodeId(2);
    const A2: NodeId = NodeId(3);
    const P: NodeId = NodeId(4);
    const R1: NodeId = NodeId(5);
    const R1X: NodeId = NodeId(6);
    const R2: NodeId = NodeId(7);
    const R2X: NodeId = NodeId(8);

    fn node(id: u32, name: &str, path: &str, parent: Option<NodeId>, kind: NodeKind) -> Node {
        Node {
            id: StateId::new(id),
            name: name.to_string(),
            path: path.to_string(),
            parent,
            kind,
            active: false,
            stats: EntryStats::default(),
        }
    }

    fn composite(default: u32, children: Vec<NodeId>) -> NodeKind {
        NodeKind::Composite {
            default: StateId::new(default),
            active: None,
            children,
            max_iterations: 1000,
        }
    }

    // top ─┬─ A ─┬─ A1
    //      │     └─ A2
    //      └─ P ─┬─ R1 ── R1X
    //            └─ R2 ── R2X
    fn sample_tree() -> Tree {
        let mut top = node(0, "top", "top", None, composite(1, vec![A, P]));
        top.active = true;
        Tree {
            nodes: vec![
                top,
                node(1, "A", "top/A", Some(TOP), composite(1, vec![A1, A2])),
                node(1, "A1", "top/A/A1", Some(A), NodeKind::Simple),
                node(2, "A2", "top/A/A2", Some(A), NodeKind::Simple),
                node(2, "P", "top/P", Some(TOP), NodeKind::Parallel { regions: vec![R1, R2] }),
                node(1, "R1", "top/P/R1", Some(P), composite(1, vec![R1X])),
                node(1, "X", "top/P/R1/X", Some(R1), NodeKind::Simple),
                node(2, "R2", "top/P/R2", Some(P), composite(1, vec![R2X])),
                node(1, "X", "top/P/R2/X", Some(R2), NodeKind::Simple),
            ],
            record_stats: true,
        }
    }

    #[test]
    fn entering_leaf_activates_ancestor_chain() {
        let mut tree = sample_tree();
        let flags = tree.enter(A2, TransFlags::CONSUMED);

        assert_eq!(flags, TransFlags::CONSUMED | TransFlags::RUN_TO_COMPLETE);
        assert!(tree.node(A).active);
        assert!(tree.node(A2).active);
        assert_eq!(tree.slot(TOP), Some(StateId::new(1)));
        assert_eq!(tree.slot(A), Some(StateId::new(2)));
        assert_eq!(tree.node(A).stats.entries, 1);
    }

    #[test]
    fn entering_sibling_of_active_leaf_only_touches_parent_slot() {
        let mut tree = sample_tree();
        tree.enter(A1, TransFlags::COMPLETE);
        tree.exit(A1);
        tree.enter(A2, TransFlags::COMPLETE);

        assert_eq!(tree.node(A).stats.entries, 1);
        assert_eq!(tree.active_child(A), Some(A2));
        assert!(!tree.node(A1).active);
    }

    #[test]
    fn entering_with_stale_sibling_exits_it() {
        let mut tree = sample_tree();
        tree.enter(A1, TransFlags::COMPLETE);
        tree.enter(A2, TransFlags::COMPLETE);

        assert!(!tree.node(A1).active);
        assert!(tree.node(A1).stats.last_sojourn.is_some());
        assert_eq!(tree.active_child(A), Some(A2));
    }

    #[test]
    fn exit_returns_enclosing_and_clears_slot() {
        let mut tree = sample_tree();
        tree.enter(A1, TransFlags::COMPLETE);

        assert_eq!(tree.exit(A1), Some(A));
        assert_eq!(tree.slot(A), None);
        assert!(tree.node(A).active);
    }

    #[test]
    fn exiting_composite_exits_active_descendants() {
        let mut tree = sample_tree();
        tree.enter(A2, TransFlags::COMPLETE);

        assert_eq!(tree.exit(A), Some(TOP));
        assert!(!tree.node(A).active);
        assert!(!tree.node(A2).active);
        assert_eq!(tree.slot(TOP), None);
    }

    #[test]
    fn reset_slot_exits_whichever_child_is_active() {
        let mut tree = sample_tree();
        tree.enter(A2, TransFlags::COMPLETE);
        tree.set_slot(A, Some(StateId::new(7)));

        tree.reset_slot(A);

        assert!(tree.node(A).active);
        assert!(!tree.node(A2).active);
        assert!(tree.node(A2).stats.last_sojourn.is_some());
        assert_eq!(tree.slot(A), None);
    }

    #[test]
    fn exiting_inactive_state_is_a_noop() {
        let mut tree = sample_tree();
        assert_eq!(tree.exit(A1), Some(A));
        assert_eq!(tree.node(A1).stats.entries, 0);
        assert!(tree.node(A1).stats.last_sojourn.is_none());
    }

    #[test]
    fn entering_region_leaf_activates_all_regions() {
        let mut tree = sample_tree();
        tree.enter(R1X, TransFlags::COMPLETE);

        assert!(tree.node(P).active);
        assert!(tree.node(R1).active);
        assert!(tree.node(R2).active);
        assert_eq!(tree.node(R1).stats.entries, 1);
        assert_eq!(tree.active_child(R1), Some(R1X));
        assert_eq!(tree.slot(R2), None);
    }

    #[test]
    fn region_entry_leaves_other_region_untouched() {
        let mut tree = sample_tree();
        tree.enter(R1X, TransFlags::COMPLETE);
        tree.enter(R2X, TransFlags::COMPLETE);
        tree.exit(R1X);

        assert_eq!(tree.slot(R1), None);
        assert_eq!(tree.active_child(R2), Some(R2X));
        assert!(tree.node(R2X).active);
    }

    #[test]
    fn exiting_parallel_exits_every_region() {
        let mut tree = sample_tree();
        tree.enter(R1X, TransFlags::COMPLETE);
        tree.enter(R2X, TransFlags::COMPLETE);
        tree.exit(P);

        for node in [P, R1, R1X, R2, R2X] {
            assert!(!tree.node(node).active);
        }
    }

    #[test]
    fn reentering_active_leaf_counts_as_self_transition() {
        let mut tree = sample_tree();
        tree.enter(A1, TransFlags::COMPLETE);
        tree.enter(A1, TransFlags::COMPLETE);

        assert_eq!(tree.node(A1).stats.entries, 2);
        assert!(tree.node(A1).stats.last_sojourn.is_some());
        assert!(tree.node(A1).active);
    }

    #[test]
    fn entering_top_is_noop() {
        let mut tree = sample_tree();
        let flags = tree.enter(TOP, TransFlags::COMPLETE);
        assert_eq!(flags, TransFlags::RUN_TO_COMPLETE);
        assert_eq!(tree.node(TOP).stats.entries, 0);
    }

    #[test]
    fn exiting_top_is_noop() {
        let mut tree = sample_tree();
        tree.enter(A1, TransFlags::COMPLETE);

        assert_eq!(tree.exit(TOP), None);
        assert!(tree.node(TOP).active);
        assert!(tree.node(A1).active);
    }

    #[test]
    fn active_leaves_walks_configuration() {
        let mut tree = sample_tree();
        tree.enter(R1X, TransFlags::COMPLETE);

        assert_eq!(tree.active_leaves(), vec![R1X, R2]);
    }

    #[test]
    fn disabled_stats_are_not_recorded() {
        let mut tree = sample_tree();
        tree.record_stats = false;
        tree.enter(A1, TransFlags::COMPLETE);
        assert_eq!(tree.node(A1).stats.entries, 0);
    }

    #[test]
    fn find_resolves_paths() {
        let tree = sample_tree();
        assert_eq!(tree.find("top/P/R2/X"), Some(R2X));
        assert_eq!(tree.find("top/missing"), None);
    }
}
