//! Transition result flags.
//!
//! Every `trans`, `enter` and `process` call reports what happened to the
//! presented event and whether the driving composite has to evaluate the
//! hierarchy again before yielding back to the external driver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Small bit-set returned by every transition, entry and dispatch call.
///
/// `NOT_CONSUMED` and `COMPLETE` are both the empty set, so a plain
/// "nothing happened" result is simply `TransFlags::default()`.
///
/// # Example
///
/// ```rust
/// use strata::TransFlags;
///
/// let flags = TransFlags::CONSUMED | TransFlags::RUN_TO_COMPLETE;
/// assert!(flags.is_consumed());
/// assert!(flags.needs_run_to_complete());
/// assert_eq!(flags.to_string(), "CONSUMED|RUN_TO_COMPLETE");
/// assert_eq!(TransFlags::NOT_CONSUMED, TransFlags::COMPLETE);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransFlags(u8);

impl TransFlags {
    /// The event was not used; ancestors may still consume it.
    pub const NOT_CONSUMED: Self = Self(0);

    /// No further same-cycle evaluation is required.
    pub const COMPLETE: Self = Self(0);

    /// The event was used by a transition and must not be offered again
    /// within the same dispatch cycle.
    pub const CONSUMED: Self = Self(0b001);

    /// A state was just entered, or an internal transition happened, and the
    /// driving composite must evaluate again without a new event.
    pub const RUN_TO_COMPLETE: Self = Self(0b010);

    /// Sentinel reporting a corrupted configuration. Never produced by the
    /// engine's normal paths; a composite that sees it resets its active
    /// slot and fails the dispatch with `HsmError::InvalidActiveState`.
    pub const STATE_ERROR: Self = Self(0b100);

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_consumed(self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn needs_run_to_complete(self) -> bool {
        self.contains(Self::RUN_TO_COMPLETE)
    }

    pub const fn is_state_error(self) -> bool {
        self.contains(Self::STATE_ERROR)
    }

    /// Copy of `self` with the bits of `other` cleared.
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for TransFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TransFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TransFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for TransFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("COMPLETE");
        }

        let names = [
            (Self::CONSUMED, "CONSUMED"),
            (Self::RUN_TO_COMPLETE, "RUN_TO_COMPLETE"),
            (Self::STATE_ERROR, "STATE_ERROR"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TransFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransFlags({self})")
    }
}
