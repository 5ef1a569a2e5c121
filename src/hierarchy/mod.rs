//! The running state hierarchy.
//!
//! # Key Concepts
//!
//! - **Tree**: arena of state nodes with active-child bookkeeping
//! - **Behaviours**: application transition functions, one per state
//! - **Hierarchy**: dispatches events top-down and drives run-to-completion
//!
//! Dispatch is single-threaded and synchronous. The external driver must
//! serialise calls into [`Hierarchy::process`].

pub mod behavior;
mod config;
mod machine;
pub(crate) mod tree;

pub use behavior::{from_fn, Behavior, FnBehavior, Passive, Transitions};
pub use config::{HierarchyConfig, DEFAULT_MAX_ITERATIONS};
pub use machine::Hierarchy;
pub use tree::StateKind;
