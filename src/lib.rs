//! Strata: a hierarchical state machine engine
//!
//! Strata composes *simple*, *composite* and *parallel* states into a fixed
//! tree, dispatches external events into it one at a time and evaluates
//! the tree to completion before returning control to the driver.
//!
//! # Core Concepts
//!
//! - **Transition flags**: `TransFlags` reports event consumption and
//!   whether another same-cycle evaluation is needed
//! - **Composite states** hold exactly one active child and drive the
//!   run-to-completion loop
//! - **Parallel states** dispatch every event to each orthogonal region in
//!   registration order; the first region to consume it hides it from the
//!   rest
//! - **Top state** is the root and the single entry point for the driver
//!
//! The engine never queues events, spawns threads or performs I/O.
//!
//! # Example
//!
//! ```rust
//! use strata::builder::HierarchyBuilder;
//! use strata::{from_fn, NodeId, TransFlags, Transitions};
//!
//! #[derive(Debug, PartialEq)]
//! enum Event {
//!     Coin,
//!     Push,
//! }
//!
//! let mut builder = HierarchyBuilder::<Event, ()>::new(());
//! builder.initial(1u32);
//! let turnstile = builder.composite(NodeId::TOP, 1u32, "Turnstile", 1u32);
//! let locked = builder.simple(turnstile, 1u32, "Locked");
//! let unlocked = builder.simple(turnstile, 2u32, "Unlocked");
//!
//! builder.behavior(
//!     locked,
//!     from_fn(move |event: Option<&Event>, cx: &mut Transitions<'_, ()>| match event {
//!         Some(Event::Coin) => cx.transition(locked, unlocked, TransFlags::CONSUMED),
//!         _ => TransFlags::NOT_CONSUMED,
//!     }),
//! );
//! builder.behavior(
//!     unlocked,
//!     from_fn(move |event: Option<&Event>, cx: &mut Transitions<'_, ()>| match event {
//!         Some(Event::Push) => cx.transition(unlocked, locked, TransFlags::CONSUMED),
//!         _ => TransFlags::NOT_CONSUMED,
//!     }),
//! );
//!
//! let mut machine = builder.build().unwrap();
//! machine.start().unwrap();
//!
//! assert_eq!(machine.process(&Event::Coin).unwrap(), TransFlags::CONSUMED);
//! assert_eq!(machine.configuration(), vec!["top/Turnstile/Unlocked"]);
//! assert_eq!(machine.process(&Event::Coin).unwrap(), TransFlags::NOT_CONSUMED);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod hierarchy;

pub use crate::hierarchy::behavior;

// Re-export commonly used types
pub use crate::core::{EntryStats, HsmError, NodeId, StateId, TransFlags};
pub use builder::{BuildError, BuildErrors, HierarchyBuilder};
pub use checkpoint::{CheckpointError, Snapshot};
pub use hierarchy::{
    from_fn, Behavior, Hierarchy, HierarchyConfig, Passive, StateKind, Transitions,
    DEFAULT_MAX_ITERATIONS,
};
