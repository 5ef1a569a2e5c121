//! Entry statistics.
//!
//! Optional diagnostics kept per state: how often it was entered, when it
//! was last entered and how long its last sojourn lasted. Only a state's own
//! entry and exit update its statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Entry bookkeeping for a single state.
///
/// # Example
///
/// ```rust
/// use strata::EntryStats;
/// use chrono::Utc;
///
/// let mut stats = EntryStats::default();
/// let entered = Utc::now();
/// stats.record_entry(entered);
/// stats.record_exit(entered);
///
/// assert_eq!(stats.entries, 1);
/// assert_eq!(stats.last_sojourn, Some(std::time::Duration::ZERO));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryStats {
    /// Number of times the state has been entered
    pub entries: u64,
    /// When the state was last entered
    pub last_entered_at: Option<DateTime<Utc>>,
    /// Duration of the most recently completed sojourn
    pub last_sojourn: Option<Duration>,
}

impl EntryStats {
    pub fn record_entry(&mut self, at: DateTime<Utc>) {
        self.entries += 1;
        self.last_entered_at = Some(at);
    }

    /// Close the current sojourn. A clock that moved backwards yields zero.
    pub fn record_exit(&mut self, at: DateTime<Utc>) {
        if let Some(entered) = self.last_entered_at {
            let sojourn = at
                .signed_duration_since(entered)
                .to_std()
                .unwrap_or(Duration::ZERO);
            self.last_sojourn = Some(sojourn);
        }
    }

    /// Time spent in the state so far, if it has ever been entered.
    pub fn elapsed(&self) -> Option<Duration> {
        self.last_entered_at.map(|entered| {
            Utc::now()
                .signed_duration_since(entered)
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_are_empty() {
        let stats = EntryStats::default();
        assert_eq!(stats.entries, 0);
        assert!(stats.last_entered_at.is_none());
        assert!(stats.last_sojourn.is_none());
        assert!(stats.elapsed().is_none());
    }

    #[test]
    fn entry_increments_count() {
        let mut stats = EntryStats::default();
        stats.record_entry(Utc::now());
        stats.record_entry(Utc::now());
        assert_eq!(stats.entries, 2);
        assert!(stats.last_entered_at.is_some());
    }

    #[test]
    fn exit_measures_sojourn() {
        let mut stats = EntryStats::default();
        let entered = Utc::now();
        stats.record_entry(entered);
        stats.record_exit(entered + chrono::Duration::milliseconds(25));
        assert_eq!(stats.last_sojourn, Some(Duration::from_millis(25)));
    }

    #[test]
    fn exit_before_entry_is_clamped_to_zero() {
        let mut stats = EntryStats::default();
        let entered = Utc::now();
        stats.record_entry(entered);
        stats.record_exit(entered - chrono::Duration::seconds(1));
        assert_eq!(stats.last_sojourn, Some(Duration::ZERO));
    }

    #[test]
    fn exit_without_entry_records_nothing() {
        let mut stats = EntryStats::default();
        stats.record_exit(Utc::now());
        assert!(stats.last_sojourn.is_none());
    }

    #[test]
    fn stats_serialize_correctly() {
        let mut stats = EntryStats::default();
        stats.record_entry(Utc::now());
        let json = serde_json::to_string(&stats).unwrap();
        let back: EntryStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
