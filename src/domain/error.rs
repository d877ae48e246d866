// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Typed errors for the training engine. The CLI and use-case
// layers still speak anyhow::Result; these enums exist so the
// engine can react differently to each failure class:
//
//   Configuration  → fatal, surfaced before any batch runs
//   EmptyWindow    → a metric was averaged with no samples
//   Checkpoint     → fatal for the operation that triggered it,
//                    except improvement checkpoints (warning)
//   Backend        → forward/backward/inference failed, run aborts
//   Data           → malformed or insufficient input data

use std::path::PathBuf;
use thiserror::Error;

/// Raised when `RunningMetrics::average` is called on an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot average an empty metric window")]
pub struct EmptyWindowError;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed for '{key}' at '{}': {source}", .path.display())]
    Io {
        key:    String,
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no checkpoint stored under '{key}'")]
    NotFound { key: String },

    #[error("checkpoint '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    EmptyWindow(#[from] EmptyWindowError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("compute backend error: {0}")]
    Backend(String),

    #[error("data error: {0}")]
    Data(String),
}

impl TrainError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True for the "bad run parameters" class of failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
