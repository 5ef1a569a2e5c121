//! Core value types of the engine.
//!
//! - Transition result flags via `TransFlags`
//! - State identities (`StateId`) and arena addresses (`NodeId`)
//! - Per-state entry statistics
//! - Fatal dispatch errors

mod error;
mod flags;
mod state;
mod stats;

pub use error::HsmError;
pub use flags::TransFlags;
pub use state::{NodeId, StateId};
pub use stats::EntryStats;
