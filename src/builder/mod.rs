//! Builder API for assembling hierarchies.
//!
//! This module provides the hierarchy builder, a macro for declaring state
//! identities and ready-made behaviours for the most common transitions.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::{BuildError, BuildErrors};
pub use machine::HierarchyBuilder;

use crate::core::{NodeId, TransFlags};
use crate::hierarchy::{from_fn, Behavior, Transitions};

/// Behaviour that moves from `from` to `to` when `event` arrives.
///
/// # Example
///
/// ```
/// use strata::builder::{simple_transition, HierarchyBuilder};
/// use strata::NodeId;
///
/// #[derive(PartialEq)]
/// enum Ev { Next }
///
/// let mut builder = HierarchyBuilder::<Ev, ()>::new(());
/// builder.initial(1u32);
/// let flow = builder.composite(NodeId::TOP, 1u32, "Flow", 1u32);
/// let first = builder.simple(flow, 1u32, "First");
/// let second = builder.simple(flow, 2u32, "Second");
/// builder.behavior(first, simple_transition(Ev::Next, first, second));
/// ```
pub fn simple_transition<E, Ctx>(event: E, from: NodeId, to: NodeId) -> impl Behavior<E, Ctx>
where
    E: PartialEq + Send + 'static,
{
    from_fn(move |received: Option<&E>, cx: &mut Transitions<'_, Ctx>| {
        if received == Some(&event) {
            cx.transition(from, to, TransFlags::CONSUMED)
        } else {
            TransFlags::NOT_CONSUMED
        }
    })
}

/// Like [`simple_transition`], but only fires while `guard` accepts the
/// shared environment.
///
/// # Example
///
/// ```
/// use strata::builder::{guarded_transition, HierarchyBuilder};
/// use strata::NodeId;
///
/// #[derive(PartialEq)]
/// enum Ev { Open }
///
/// struct Door { locked: bool }
///
/// let mut builder = HierarchyBuilder::<Ev, Door>::new(Door { locked: true });
/// builder.initial(1u32);
/// let door = builder.composite(NodeId::TOP, 1u32, "Door", 1u32);
/// let closed = builder.simple(door, 1u32, "Closed");
/// let open = builder.simple(door, 2u32, "Open");
/// builder.behavior(
///     closed,
///     guarded_transition(Ev::Open, closed, open, |door: &Door| !door.locked),
/// );
/// ```
pub fn guarded_transition<E, Ctx, G>(
    event: E,
    from: NodeId,
    to: NodeId,
    guard: G,
) -> impl Behavior<E, Ctx>
where
    E: PartialEq + Send + 'static,
    G: Fn(&Ctx) -> bool + Send + 'static,
{
    from_fn(move |received: Option<&E>, cx: &mut Transitions<'_, Ctx>| {
        if received == Some(&event) && guard(cx.env()) {
            cx.transition(from, to, TransFlags::CONSUMED)
        } else {
            TransFlags::NOT_CONSUMED
        }
    })
}

/// Behaviour that leaves `from` for `to` as soon as it is evaluated without
/// an event, i.e. right after `from` has been entered.
pub fn completion_transition<E, Ctx>(from: NodeId, to: NodeId) -> impl Behavior<E, Ctx>
where
    E: 'static,
{
    from_fn(move |received: Option<&E>, cx: &mut Transitions<'_, Ctx>| {
        if received.is_none() {
            cx.transition(from, to, TransFlags::COMPLETE)
        } else {
            TransFlags::NOT_CONSUMED
        }
    })
}
