//! Errors in the library.
use thiserror::Error;

/// Errors raised by the training core.
#[derive(Debug, Error)]
pub enum DeepqError {
    /// The replay buffer does not hold enough transitions to sample a batch.
    #[error("replay buffer is not ready: {len} transitions, batch size {batch_size}")]
    NotReady {
        /// Number of stored transitions.
        len: usize,

        /// Requested batch size.
        batch_size: usize,
    },

    /// The frame stack was composed before it was filled.
    #[error("frame stack holds {len} frames, it must be filled before composing")]
    FrameStackNotFull {
        /// Number of frames in the stack.
        len: usize,
    },

    /// The checkpoint identifier does not carry a frame count.
    #[error("invalid checkpoint identifier: {0}")]
    InvalidCheckpointId(String),

    /// An action-value vector without any element.
    #[error("empty action-value vector")]
    EmptyActionValues,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
