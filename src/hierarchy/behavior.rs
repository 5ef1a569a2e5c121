//! Application transition logic and the handle it uses to move states.

use crate::core::{EntryStats, NodeId, StateId, TransFlags};
use crate::hierarchy::tree::Tree;

/// Transition function of a single state.
///
/// `trans` must be short-running and must not block. It receives `None`
/// when the event has already been consumed lower in the hierarchy, or when
/// the state is being evaluated for completion transitions. Any event it
/// does not handle must yield `TransFlags::NOT_CONSUMED`.
///
/// # Example
///
/// ```rust
/// use strata::{Behavior, TransFlags, Transitions};
///
/// struct CountTicks {
///     ticks: usize,
/// }
///
/// impl Behavior<&'static str, ()> for CountTicks {
///     fn trans(
///         &mut self,
///         event: Option<&&'static str>,
///         _cx: &mut Transitions<'_, ()>,
///     ) -> TransFlags {
///         match event {
///             Some(&"tick") => {
///                 self.ticks += 1;
///                 TransFlags::CONSUMED
///             }
///             _ => TransFlags::NOT_CONSUMED,
///         }
///     }
/// }
/// ```
pub trait Behavior<E, Ctx>: Send {
    fn trans(&mut self, event: Option<&E>, cx: &mut Transitions<'_, Ctx>) -> TransFlags;
}

/// Behaviour that never handles anything. Used for states without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl<E, Ctx> Behavior<E, Ctx> for Passive {
    fn trans(&mut self, _event: Option<&E>, _cx: &mut Transitions<'_, Ctx>) -> TransFlags {
        TransFlags::NOT_CONSUMED
    }
}

/// Behaviour backed by a closure. Built with [`from_fn`].
pub struct FnBehavior<F>(F);

impl<E, Ctx, F> Behavior<E, Ctx> for FnBehavior<F>
where
    F: FnMut(Option<&E>, &mut Transitions<'_, Ctx>) -> TransFlags + Send,
{
    fn trans(&mut self, event: Option<&E>, cx: &mut Transitions<'_, Ctx>) -> TransFlags {
        (self.0)(event, cx)
    }
}

/// Wrap a closure as a [`Behavior`].
///
/// # Example
///
/// ```rust
/// use strata::behavior::from_fn;
/// use strata::{Behavior, TransFlags, Transitions};
///
/// let consume_all = from_fn(|event: Option<&u8>, _cx: &mut Transitions<'_, ()>| {
///     if event.is_some() {
///         TransFlags::CONSUMED
///     } else {
///         TransFlags::NOT_CONSUMED
///     }
/// });
/// # fn assert_behavior<B: Behavior<u8, ()>>(_: &B) {}
/// # assert_behavior(&consume_all);
/// ```
pub fn from_fn<E, Ctx, F>(f: F) -> FnBehavior<F>
where
    F: FnMut(Option<&E>, &mut Transitions<'_, Ctx>) -> TransFlags + Send,
{
    FnBehavior(f)
}

/// Handle passed to every `trans` call.
///
/// It is the only way application code changes the configuration, and it
/// exposes the shared environment injected at construction.
pub struct Transitions<'a, Ctx> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) env: &'a Ctx,
    pub(crate) current: NodeId,
}

impl<'a, Ctx> Transitions<'a, Ctx> {
    /// Shared environment of the hierarchy.
    pub fn env(&self) -> &Ctx {
        self.env
    }

    /// State whose `trans` is running.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Enter `target`: its enclosing chain is entered first where needed,
    /// then it becomes its enclosing composite's active child.
    ///
    /// Returns `prior | RUN_TO_COMPLETE`, giving the freshly entered state a
    /// chance to fire a completion transition.
    pub fn enter(&mut self, target: NodeId, prior: TransFlags) -> TransFlags {
        self.tree.enter(target, prior)
    }

    /// Exit `state` and everything active beneath it. Returns the enclosing
    /// state so a sibling can be entered straight away.
    pub fn exit(&mut self, state: NodeId) -> Option<NodeId> {
        self.tree.exit(state)
    }

    /// Exit `from`, then enter `to`.
    pub fn transition(&mut self, from: NodeId, to: NodeId, prior: TransFlags) -> TransFlags {
        self.tree.exit(from);
        self.tree.enter(to, prior)
    }

    /// Exit whatever is active in `target`'s enclosing composite, then enter
    /// `target`.
    pub fn switch_to(&mut self, target: NodeId, prior: TransFlags) -> TransFlags {
        if let Some(sibling) = self
            .tree
            .node(target)
            .parent
            .and_then(|parent| self.tree.active_child(parent))
        {
            self.tree.exit(sibling);
        }
        self.tree.enter(target, prior)
    }

    pub fn is_active(&self, state: NodeId) -> bool {
        self.tree.node(state).active
    }

    /// Active child of a composite, if any.
    pub fn active_child(&self, state: NodeId) -> Option<NodeId> {
        self.tree.active_child(state)
    }

    pub fn enclosing(&self, state: NodeId) -> Option<NodeId> {
        self.tree.node(state).parent
    }

    pub fn id(&self, state: NodeId) -> StateId {
        self.tree.node(state).id
    }

    pub fn name(&self, state: NodeId) -> &str {
        &self.tree.node(state).name
    }

    pub fn stats(&self, state: NodeId) -> &EntryStats {
        &self.tree.node(state).stats
    }
}
