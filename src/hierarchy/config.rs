//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default ceiling on same-cycle transition iterations per composite.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Settings applied to a hierarchy when it is built.
///
/// Missing fields fall back to their defaults, so a partial JSON document
/// is a valid configuration.
///
/// # Example
///
/// ```rust
/// use strata::HierarchyConfig;
///
/// let config: HierarchyConfig = serde_json::from_str(r#"{ "max_iterations": 50 }"#).unwrap();
/// assert_eq!(config.max_iterations, 50);
/// assert!(config.record_stats);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Child dispatches a composite may spend on completion transitions
    /// within one dispatch before the machine is treated as mis-designed.
    /// Entering the default child of an empty slot is not counted.
    pub max_iterations: usize,

    /// Whether entry statistics are maintained
    pub record_stats: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            record_stats: true,
        }
    }
}
