// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training engine depends only on these capability sets.
// Each one has more than one implementation:
//
//   Model           → BurnForecaster (LSTM), FakeModel (tests)
//   Optimizer       → BurnOptimizer (sgd / adam), FakeOptimizer
//   Partition       → BatchedPartition
//   DataSource      → SplitData
//   CheckpointStore → FileCheckpointStore, MemoryCheckpointStore (tests)
//   InverseTransform→ ColumnScaler, Identity
//   ReportSink      → ConsoleSink, CsvReportSink, FanOutSink
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::{
    batch::{Batch, BatchOutput},
    error::{CheckpointError, TrainError},
    report::{BatchProgress, PeriodReport, Split, TrainingSummary},
};

// ─── Model ────────────────────────────────────────────────────────────────────

/// Behavioural mode of a model. Eval disables dropout-style
/// stochastic layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Train,
    Eval,
}

/// Serialisable parameter snapshot: ordered parameter shapes plus
/// an opaque, backend-encoded payload of the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub shapes:  Vec<Vec<usize>>,
    pub payload: Vec<u8>,
}

/// An opaque differentiable sequence model.
pub trait Model {
    /// Whatever backpropagation produces for the optimiser to consume
    type Gradients;

    /// Forward pass, loss against the batch targets and backprop.
    /// Returns the batch output (loss, predictions, targets) and the
    /// gradients.
    fn train_step(&mut self, batch: &Batch) -> Result<(BatchOutput, Self::Gradients), TrainError>;

    /// Forward pass without gradient tracking. Takes `&self`: inference
    /// can never touch parameters.
    fn infer(&self, batch: &Batch) -> Result<BatchOutput, TrainError>;

    /// Parameter values in a stable, declaration order.
    fn parameters(&self) -> Vec<Vec<f32>>;

    fn mode(&self) -> Mode;

    fn set_mode(&mut self, mode: Mode);

    fn state(&self) -> Result<ModelState, TrainError>;

    /// Replace all parameters with `state`. `key` names the checkpoint
    /// the state came from, for error reporting.
    fn load_state(&mut self, key: &str, state: &ModelState) -> Result<(), CheckpointError>;
}

// ─── Optimizer ────────────────────────────────────────────────────────────────

/// A pluggable `(parameters, gradients) -> updated parameters` strategy.
pub trait Optimizer<M: Model> {
    fn name(&self) -> &str;

    /// Clear any gradient accumulated since the last update. Backends
    /// that hand gradients over by value have nothing to clear.
    fn zero_accumulated_gradients(&mut self) {}

    fn apply_update(&mut self, model: &mut M, gradients: M::Gradients) -> Result<(), TrainError>;
}

// ─── Data ─────────────────────────────────────────────────────────────────────

/// An ordered, finite, restartable sequence of batches.
pub trait Partition {
    /// Starts a fresh pass over the partition, in partition order.
    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_>;

    fn batch_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.batch_count() == 0
    }
}

/// Supplies the train / validation / optional test partitions.
pub trait DataSource {
    type Partition: Partition;

    fn train(&self) -> &Self::Partition;

    fn validation(&self) -> &Self::Partition;

    fn test(&self) -> Option<&Self::Partition>;
}

/// Maps normalised values back to the original price scale.
pub trait InverseTransform {
    fn inverse_transform(&self, values: &[f32]) -> Vec<f32>;
}

/// Leaves values untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl InverseTransform for Identity {
    fn inverse_transform(&self, values: &[f32]) -> Vec<f32> {
        values.to_vec()
    }
}

// ─── Checkpoints ──────────────────────────────────────────────────────────────

/// Where and which version of a checkpoint was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointInfo {
    pub key:     String,
    pub version: u64,
    pub path:    PathBuf,
}

/// Keys name directories and files, so they are limited to ASCII
/// letters, digits, `-`, `_` and `.` (but not `.` or `..` alone).
pub fn is_valid_checkpoint_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Persists model snapshots keyed by a logical model name.
///
/// `save` must be a full replace from the caller's point of view:
/// a crash mid-save leaves the previous checkpoint intact.
pub trait CheckpointStore {
    fn save(&self, key: &str, state: &ModelState) -> Result<CheckpointInfo, CheckpointError>;

    fn load(&self, key: &str) -> Result<ModelState, CheckpointError>;
}

// ─── Reporting ────────────────────────────────────────────────────────────────

/// Receives progress, loss curves and prediction series. Sinks are
/// infallible from the trainer's point of view; implementations log
/// their own I/O failures.
pub trait ReportSink {
    fn on_batch(&mut self, _progress: &BatchProgress) {}

    fn on_period(&mut self, _report: &PeriodReport) {}

    /// Predictions and ground truth, already in original scale.
    fn on_series(&mut self, _split: Split, _predictions: &[f32], _ground_truth: &[f32]) {}

    fn on_finish(&mut self, _summary: &TrainingSummary) {}
}
