//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum MosimError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The configured capacity cannot hold a single episode.
    #[error("capacity {capacity} is smaller than max_episode_len {max_episode_len}")]
    CapacityTooSmall {
        /// Total number of transitions.
        capacity: usize,
        /// Maximum length of an episode.
        max_episode_len: usize,
    },

    /// A vector had a different length than configured.
    #[error("{name} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        /// Name of the offending field.
        name: &'static str,
        /// Configured dimension.
        expected: usize,
        /// Given dimension.
        actual: usize,
    },

    /// The episode being filled already holds `max_episode_len` transitions.
    #[error("episode in slot {slot} already holds {max_episode_len} transitions")]
    EpisodeOverflow {
        /// Slot of the episode.
        slot: usize,
        /// Maximum length of an episode.
        max_episode_len: usize,
    },

    /// Sampling was requested from an empty buffer.
    #[error("replay buffer is empty")]
    EmptyBuffer,

    /// A snapshot does not match the configuration it is loaded with.
    #[error("snapshot mismatch: {0}")]
    SnapshotMismatch(String),
}
