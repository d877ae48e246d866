// ============================================================
// Layer 3 — Reporting Records
// ============================================================
// Plain data handed by the trainer to a ReportSink. Sinks
// decide what to do with it (print, append to CSV, plot);
// the trainer never depends on what they do.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::{error::TrainError, traits::CheckpointInfo};

/// Which of the three disjoint data splits a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train      => "train",
            Split::Validation => "validation",
            Split::Test       => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train"               => Ok(Split::Train),
            "validation" | "val"  => Ok(Split::Validation),
            "test"                => Ok(Split::Test),
            other => Err(TrainError::config(format!(
                "unknown split '{other}' (expected train, validation or test)"
            ))),
        }
    }
}

/// Emitted after every optimiser step.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    pub epoch:   usize,
    pub epochs:  usize,
    /// 1-based index of the batch within the epoch
    pub batch:   usize,
    pub batches: usize,
    pub loss:    f64,
}

/// Loss and metric averaged over one partition pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalScore {
    pub loss:   f64,
    pub metric: f64,
}

/// 95% band of a prediction series, in the series' own scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Emitted once per reporting period (every `print_every` batches).
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    pub epoch:      usize,
    pub epochs:     usize,
    pub batch:      usize,
    pub batches:    usize,
    /// Mean training loss over the period's batches
    pub train_loss: f64,
    pub validation: EvalScore,
    /// Held-out score, reporting only; never drives early stopping
    pub test:          Option<EvalScore>,
    /// Band of the test predictions in original price scale
    pub test_interval: Option<ConfidenceInterval>,
    pub best_score: f64,
    pub improved:   bool,
    pub stopped:    bool,
}

/// Why a run ended successfully. Fatal aborts are `Err`, not a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Every configured epoch ran to completion
    EpochsExhausted,
    /// The early-stopping monitor signalled STOPPED
    EarlyStopped { epoch: usize, batch: usize },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::EpochsExhausted => f.write_str("epoch budget exhausted"),
            TerminationReason::EarlyStopped { epoch, batch } => {
                write!(f, "early stopping at epoch {epoch}, batch {batch}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub reason:           TerminationReason,
    pub epochs_completed: usize,
    pub batches_seen:     usize,
    pub evaluations:      usize,
    /// None if no validation score was ever observed
    pub best_score:       Option<f64>,
    pub last_checkpoint:  Option<CheckpointInfo>,
}

impl TrainingSummary {
    pub fn stopped_early(&self) -> bool {
        matches!(self.reason, TerminationReason::EarlyStopped { .. })
    }
}
