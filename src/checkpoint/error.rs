//! Snapshot encoding and restore failures.

use thiserror::Error;

/// Why a snapshot could not be encoded, decoded or applied.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// A snapshot could not be written as JSON or bincode
    #[error("Failed to encode snapshot: {0}")]
    SerializationFailed(String),

    /// Bytes or text did not decode into a snapshot
    #[error("Failed to decode snapshot: {0}")]
    DeserializationFailed(String),

    #[error("Snapshot format v{found} cannot be restored (expected v{supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The snapshot lists different states than the hierarchy holds
    #[error("Snapshot does not match hierarchy: {0}")]
    ShapeMismatch(String),

    /// Recorded active flags and slots do not form a valid configuration.
    /// The hierarchy is left as it was before the restore.
    #[error("Snapshot configuration is inconsistent: {0}")]
    InconsistentConfiguration(String),
}
