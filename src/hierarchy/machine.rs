//! Hierarchy that dispatches events with run-to-completion semantics.

use crate::core::{EntryStats, HsmError, NodeId, StateId, TransFlags};
use crate::hierarchy::behavior::{Behavior, Transitions};
use crate::hierarchy::config::HierarchyConfig;
use crate::hierarchy::tree::{StateKind, Tree};
use tracing::{debug, error, trace};

/// A fully assembled state hierarchy.
///
/// Owns every state node, its behaviour and the shared environment. The
/// external driver calls [`Hierarchy::process`] with one event at a time;
/// nothing inside the engine queues, blocks or spawns.
///
/// `NodeId`s passed to query methods must come from the builder of this
/// hierarchy; foreign ids may panic.
pub struct Hierarchy<E, Ctx> {
    pub(crate) tree: Tree,
    behaviors: Vec<Box<dyn Behavior<E, Ctx>>>,
    env: Ctx,
    config: HierarchyConfig,
}

impl<E, Ctx> Hierarchy<E, Ctx> {
    pub(crate) fn from_parts(
        tree: Tree,
        behaviors: Vec<Box<dyn Behavior<E, Ctx>>>,
        env: Ctx,
        config: HierarchyConfig,
    ) -> Self {
        Self {
            tree,
            behaviors,
            env,
            config,
        }
    }

    /// Settle the initial configuration.
    ///
    /// Dispatches "no event" through the top state, entering every default
    /// child and running completion transitions.
    pub fn start(&mut self) -> Result<TransFlags, HsmError> {
        debug!("starting hierarchy");
        self.process_node(NodeId::TOP, None)
    }

    /// Dispatch one external event into the hierarchy.
    ///
    /// Returns the combined flags; `CONSUMED` is set when any state used the
    /// event. An event nobody handles is dropped and reported as
    /// `NOT_CONSUMED`.
    pub fn process(&mut self, event: &E) -> Result<TransFlags, HsmError> {
        debug!("dispatching event");
        let flags = self.process_node(NodeId::TOP, Some(event))?;
        trace!(%flags, "dispatch complete");
        Ok(flags)
    }

    fn process_node(&mut self, node: NodeId, event: Option<&E>) -> Result<TransFlags, HsmError> {
        match self.tree.node(node).kind.state_kind() {
            StateKind::Simple => Ok(self.trans(node, event)),
            StateKind::Composite => self.process_composite(node, event),
            StateKind::Parallel => self.process_parallel(node, event),
        }
    }

    fn process_composite(
        &mut self,
        node: NodeId,
        event: Option<&E>,
    ) -> Result<TransFlags, HsmError> {
        let limit = self.tree.max_iterations(node);
        let mut event = event;
        let mut consumed = false;
        let mut iterations = 0;

        loop {
            // Entering the default child of an empty slot is not counted.
            if self.tree.slot(node).is_some() {
                iterations += 1;
            }
            let flags = self.dispatch_active(node, event)?;
            if flags.is_consumed() {
                event = None;
                consumed = true;
            }
            if !self.tree.node(node).active {
                // A descendant transitioned out of this state; the enclosing
                // composite continues the cycle.
                trace!(state = %self.tree.node(node).path, "exited during dispatch");
                return Ok(if consumed {
                    flags | TransFlags::CONSUMED
                } else {
                    flags
                });
            }
            if !flags.needs_run_to_complete() {
                break;
            }
            if iterations >= limit {
                let path = self.tree.node(node).path.clone();
                error!(state = %path, iterations, %flags, "run-to-completion ceiling reached");
                return Err(HsmError::RunToCompletionExceeded {
                    state: path,
                    iterations,
                    flags,
                });
            }
        }

        let own = self.trans(node, event);
        Ok(if consumed {
            own | TransFlags::CONSUMED
        } else {
            own
        })
    }

    fn dispatch_active(&mut self, node: NodeId, event: Option<&E>) -> Result<TransFlags, HsmError> {
        let Some(active) = self.tree.slot(node) else {
            let Some(default) = self.tree.default_child(node) else {
                return Err(self.invalid_active(node, None, TransFlags::COMPLETE));
            };
            trace!(state = %self.tree.node(default).path, "entering default child");
            return Ok(self.tree.enter(default, TransFlags::COMPLETE));
        };

        let Some(child) = self.tree.child_by_id(node, active) else {
            return Err(self.invalid_active(node, Some(active), TransFlags::COMPLETE));
        };

        let flags = self.process_node(child, event)?;
        if flags.is_state_error() {
            return Err(self.invalid_active(node, Some(active), flags));
        }
        Ok(flags)
    }

    fn invalid_active(
        &mut self,
        node: NodeId,
        active: Option<StateId>,
        flags: TransFlags,
    ) -> HsmError {
        self.tree.reset_slot(node);
        let path = self.tree.node(node).path.clone();
        error!(state = %path, ?active, %flags, "invalid active state; children exited, slot reset");
        HsmError::InvalidActiveState {
            state: path,
            active,
            flags,
        }
    }

    fn process_parallel(
        &mut self,
        node: NodeId,
        event: Option<&E>,
    ) -> Result<TransFlags, HsmError> {
        let mut event = event;
        let mut combined = TransFlags::NOT_CONSUMED;

        for index in 0..self.tree.children(node).len() {
            let region = self.tree.children(node)[index];
            let flags = self.process_node(region, event)?;
            if flags.is_consumed() {
                event = None;
            }
            combined |= flags;
            if !self.tree.node(node).active {
                trace!(state = %self.tree.node(node).path, "exited during dispatch");
                return Ok(combined);
            }
        }

        Ok(combined | self.trans(node, event))
    }

    fn trans(&mut self, node: NodeId, event: Option<&E>) -> TransFlags {
        let Self {
            tree,
            behaviors,
            env,
            ..
        } = self;
        let mut cx = Transitions {
            tree,
            env,
            current: node,
        };
        behaviors[node.0].trans(event, &mut cx)
    }

    pub fn env(&self) -> &Ctx {
        &self.env
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Number of states, including the top state.
    pub fn len(&self) -> usize {
        self.tree.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.nodes.is_empty()
    }

    /// Every state in assembly order, starting with the top state.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.tree.nodes.len()).map(NodeId)
    }

    pub fn kind(&self, node: NodeId) -> StateKind {
        self.tree.node(node).kind.state_kind()
    }

    /// Children of a composite, or regions of a parallel state, in
    /// registration order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.tree.children(node)
    }

    pub fn id(&self, node: NodeId) -> StateId {
        self.tree.node(node).id
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.tree.node(node).name
    }

    /// Slash-separated path from the top state, e.g. `top/A/A1`.
    pub fn path(&self, node: NodeId) -> &str {
        &self.tree.node(node).path
    }

    /// Look up a state by its path.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.tree.find(path)
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.tree.node(node).active
    }

    pub fn enclosing(&self, node: NodeId) -> Option<NodeId> {
        self.tree.node(node).parent
    }

    /// Active child of a composite, if its slot currently names one.
    pub fn active_child(&self, node: NodeId) -> Option<NodeId> {
        self.tree.active_child(node)
    }

    /// Raw active-child slot of a composite.
    pub fn active_id(&self, node: NodeId) -> Option<StateId> {
        self.tree.slot(node)
    }

    /// Active states without active children.
    pub fn active_leaves(&self) -> Vec<NodeId> {
        self.tree.active_leaves()
    }

    /// Paths of the current configuration's leaves.
    pub fn configuration(&self) -> Vec<&str> {
        self.tree
            .active_leaves()
            .into_iter()
            .map(|node| self.path(node))
            .collect()
    }

    pub fn stats(&self, node: NodeId) -> &EntryStats {
        &self.tree.node(node).stats
    }
}
