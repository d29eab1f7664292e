use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for cfssl operations
pub type Result<T> = std::result::Result<T, CfsslError>;

/// Errors from running cfssl or storing what it produced
#[derive(Error, Debug)]
pub enum CfsslError {
    /// The binary could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was invoked
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The binary ran but reported failure
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        /// Program that was invoked
        program: String,
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// The binary did not finish in time
    #[error("{program} timed out after {after:?}")]
    Timeout {
        /// Program that was invoked
        program: String,
        /// Configured limit
        after: Duration,
    },

    /// Standard output was not a cfssl JSON envelope
    #[error("unexpected cfssl output: {0}")]
    Envelope(#[from] serde_json::Error),

    /// An artifact could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl CfsslError {
    /// Returns true if cfssl itself could not be found or started
    #[must_use]
    pub const fn is_spawn_error(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}
