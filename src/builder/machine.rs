//! Builder for assembling state hierarchies.

use crate::builder::error::{BuildError, BuildErrors};
use crate::core::{EntryStats, NodeId, StateId};
use crate::hierarchy::tree::{Node, NodeKind, StateKind, Tree};
use crate::hierarchy::{Behavior, Hierarchy, HierarchyConfig, Passive};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

struct Draft<E, Ctx> {
    id: StateId,
    name: String,
    parent: Option<NodeId>,
    kind: StateKind,
    default: StateId,
    max_iterations: Option<usize>,
    behavior: Option<Box<dyn Behavior<E, Ctx>>>,
}

/// Builder that wires a fixed tree of states once, at start-up.
///
/// Each `simple`/`composite`/`parallel` call names the enclosing state and
/// returns the new state's `NodeId`, which behaviours capture to address
/// transition targets. Structural checks run in [`build`](Self::build) and
/// report every problem at once.
///
/// # Example
///
/// ```rust
/// use strata::builder::{simple_transition, HierarchyBuilder};
/// use strata::{NodeId, TransFlags};
///
/// #[derive(PartialEq)]
/// enum Ev { Flip }
///
/// let mut builder = HierarchyBuilder::<Ev, ()>::new(());
/// builder.initial(1u32);
/// let switch = builder.composite(NodeId::TOP, 1u32, "Switch", 1u32);
/// let off = builder.simple(switch, 1u32, "Off");
/// let on = builder.simple(switch, 2u32, "On");
/// builder.behavior(off, simple_transition(Ev::Flip, off, on));
/// builder.behavior(on, simple_transition(Ev::Flip, on, off));
///
/// let mut machine = builder.build().unwrap();
/// machine.start().unwrap();
/// assert_eq!(machine.process(&Ev::Flip).unwrap(), TransFlags::CONSUMED);
/// assert_eq!(machine.configuration(), vec!["top/Switch/On"]);
/// ```
pub struct HierarchyBuilder<E, Ctx> {
    env: Ctx,
    initial: Option<StateId>,
    config: HierarchyConfig,
    drafts: Vec<Draft<E, Ctx>>,
    misuse: Vec<BuildError>,
}

impl<E, Ctx> HierarchyBuilder<E, Ctx> {
    /// Create a builder holding only the top state.
    ///
    /// `env` is the shared environment every behaviour can read through
    /// `Transitions::env`.
    pub fn new(env: Ctx) -> Self {
        let top = Draft {
            id: StateId::TOP,
            name: "top".to_string(),
            parent: None,
            kind: StateKind::Composite,
            default: StateId::TOP,
            max_iterations: None,
            behavior: None,
        };
        Self {
            env,
            initial: None,
            config: HierarchyConfig::default(),
            drafts: vec![top],
            misuse: Vec::new(),
        }
    }

    /// Default child of the top state (required).
    pub fn initial(&mut self, id: impl Into<StateId>) -> &mut Self {
        self.initial = Some(id.into());
        self
    }

    pub fn config(&mut self, config: HierarchyConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn top(&self) -> NodeId {
        NodeId::TOP
    }

    /// Add a leaf state.
    pub fn simple(
        &mut self,
        parent: NodeId,
        id: impl Into<StateId>,
        name: impl Into<String>,
    ) -> NodeId {
        self.push(parent, id.into(), name.into(), StateKind::Simple, StateId::TOP)
    }

    /// Add a composite state whose slot starts out at the null identity and
    /// resolves to `default` on first dispatch.
    pub fn composite(
        &mut self,
        parent: NodeId,
        id: impl Into<StateId>,
        name: impl Into<String>,
        default: impl Into<StateId>,
    ) -> NodeId {
        self.push(
            parent,
            id.into(),
            name.into(),
            StateKind::Composite,
            default.into(),
        )
    }

    /// Add a parallel state. Its regions are added with [`region`](Self::region).
    pub fn parallel(
        &mut self,
        parent: NodeId,
        id: impl Into<StateId>,
        name: impl Into<String>,
    ) -> NodeId {
        self.push(parent, id.into(), name.into(), StateKind::Parallel, StateId::TOP)
    }

    /// Add an orthogonal region (a composite) to a parallel state. Regions
    /// are dispatched in the order they are added.
    pub fn region(
        &mut self,
        parallel: NodeId,
        id: impl Into<StateId>,
        name: impl Into<String>,
        default: impl Into<StateId>,
    ) -> NodeId {
        self.composite(parallel, id, name, default)
    }

    /// Attach the transition function of `node`, replacing any earlier one.
    pub fn behavior<B>(&mut self, node: NodeId, behavior: B) -> &mut Self
    where
        B: Behavior<E, Ctx> + 'static,
    {
        if node == NodeId::TOP {
            self.misuse.push(BuildError::TopBehavior);
        } else if let Some(draft) = self.drafts.get_mut(node.0) {
            draft.behavior = Some(Box::new(behavior));
        } else {
            self.misuse.push(BuildError::UnknownNode { node });
        }
        self
    }

    /// Override the run-to-completion ceiling of one composite.
    pub fn max_iterations(&mut self, node: NodeId, limit: usize) -> &mut Self {
        match self.drafts.get_mut(node.0) {
            Some(draft) => draft.max_iterations = Some(limit),
            None => self.misuse.push(BuildError::UnknownNode { node }),
        }
        self
    }

    fn push(
        &mut self,
        parent: NodeId,
        id: StateId,
        name: String,
        kind: StateKind,
        default: StateId,
    ) -> NodeId {
        let node = NodeId(self.drafts.len());
        self.drafts.push(Draft {
            id,
            name,
            parent: Some(parent),
            kind,
            default,
            max_iterations: None,
            behavior: None,
        });
        node
    }

    fn parent_of(&self, index: usize) -> Option<usize> {
        self.drafts[index]
            .parent
            .map(|parent| parent.0)
            .filter(|parent| *parent < index)
    }

    fn path_of(&self, index: usize) -> String {
        match self.parent_of(index) {
            Some(parent) => format!("{}/{}", self.path_of(parent), self.drafts[index].name),
            None => self.drafts[index].name.clone(),
        }
    }

    fn children_of(&self, index: usize) -> Vec<usize> {
        (index + 1..self.drafts.len())
            .filter(|child| self.parent_of(*child) == Some(index))
            .collect()
    }

    fn default_of(&self, index: usize) -> Option<StateId> {
        if index == 0 {
            self.initial
        } else {
            Some(self.drafts[index].default)
        }
    }

    /// Check the assembled structure, accumulating every problem.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        if self.initial.is_none() {
            checks.push(Validation::fail(BuildError::MissingInitialState));
        }

        for error in &self.misuse {
            checks.push(Validation::fail(error.clone()));
        }

        for index in 1..self.drafts.len() {
            checks.push(self.check_parent(index));
        }

        for index in 0..self.drafts.len() {
            checks.push(self.check_children(index));
        }

        checks.push(Validation::success(()));
        Validation::all_vec(checks).map(|_| ())
    }

    fn check_parent(&self, index: usize) -> Validation<(), NonEmptyVec<BuildError>> {
        let draft = &self.drafts[index];
        let Some(parent) = self.parent_of(index) else {
            return Validation::fail(BuildError::UnknownParent {
                state: draft.name.clone(),
                parent: draft.parent.unwrap_or(NodeId::TOP),
            });
        };

        match self.drafts[parent].kind {
            StateKind::Simple => Validation::fail(BuildError::InvalidParent {
                state: self.path_of(index),
                parent: self.path_of(parent),
            }),
            StateKind::Parallel if draft.kind != StateKind::Composite => {
                Validation::fail(BuildError::InvalidRegion {
                    state: self.path_of(index),
                })
            }
            _ => Validation::success(()),
        }
    }

    fn check_children(&self, index: usize) -> Validation<(), NonEmptyVec<BuildError>> {
        let draft = &self.drafts[index];
        let children = self.children_of(index);
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        let mut seen = HashSet::new();
        for child in &children {
            let id = self.drafts[*child].id;
            if !seen.insert(id) {
                checks.push(Validation::fail(BuildError::DuplicateStateId {
                    parent: self.path_of(index),
                    id,
                }));
            }
        }

        match draft.kind {
            StateKind::Simple => {}
            StateKind::Composite => {
                if let Some(default) = self.default_of(index) {
                    if !children.iter().any(|c| self.drafts[*c].id == default) {
                        checks.push(Validation::fail(BuildError::UnknownDefaultChild {
                            state: self.path_of(index),
                            default,
                        }));
                    }
                }
                let limit = draft.max_iterations.unwrap_or(self.config.max_iterations);
                if limit == 0 {
                    checks.push(Validation::fail(BuildError::InvalidIterationLimit {
                        state: self.path_of(index),
                    }));
                }
            }
            StateKind::Parallel => {
                if children.is_empty() {
                    checks.push(Validation::fail(BuildError::EmptyParallel {
                        state: self.path_of(index),
                    }));
                }
            }
        }

        checks.push(Validation::success(()));
        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the hierarchy.
    /// Returns every structural problem if validation fails.
    pub fn build(self) -> Result<Hierarchy<E, Ctx>, BuildErrors> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(BuildErrors(errors.iter().cloned().collect()));
        }

        let paths: Vec<String> = (0..self.drafts.len()).map(|i| self.path_of(i)).collect();
        let children: Vec<Vec<NodeId>> = (0..self.drafts.len())
            .map(|i| self.children_of(i).into_iter().map(NodeId).collect())
            .collect();
        let initial = self.initial.unwrap_or(StateId::TOP);
        let max_iterations = self.config.max_iterations;

        let mut nodes = Vec::with_capacity(self.drafts.len());
        let mut behaviors: Vec<Box<dyn Behavior<E, Ctx>>> = Vec::with_capacity(self.drafts.len());

        for (index, ((draft, path), children)) in self
            .drafts
            .into_iter()
            .zip(paths)
            .zip(children)
            .enumerate()
        {
            let kind = match draft.kind {
                StateKind::Simple => NodeKind::Simple,
                StateKind::Composite => NodeKind::Composite {
                    default: if index == 0 { initial } else { draft.default },
                    active: None,
                    children,
                    max_iterations: draft.max_iterations.unwrap_or(max_iterations),
                },
                StateKind::Parallel => NodeKind::Parallel { regions: children },
            };
            nodes.push(Node {
                id: draft.id,
                name: draft.name,
                path,
                parent: draft.parent,
                kind,
                active: index == 0,
                stats: EntryStats::default(),
            });
            behaviors.push(draft.behavior.unwrap_or_else(|| Box::new(Passive)));
        }

        debug!(states = nodes.len(), "hierarchy built");
        let tree = Tree {
            nodes,
            record_stats: self.config.record_stats,
        };
        Ok(Hierarchy::from_parts(tree, behaviors, self.env, self.config))
    }
}
