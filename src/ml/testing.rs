// ============================================================
// Layer 5 — Test Doubles
// ============================================================
// A deterministic stand-in for the LSTM so the engine can be
// tested without a compute backend:
//
//   FakeModel      → parameters are a plain Vec<f32>, train
//                    losses and eval losses are scripted;
//                    predicts target - 0.5 while training and
//                    target + 0.5 in inference
//   FakeOptimizer  → θ = θ - lr * g, counts its calls
//   MemoryCheckpointStore → versioned snapshots in a HashMap
//
// Partitions are the real BatchedPartition over synthetic
// windows, so batching behaviour is the production one.

use std::{cell::Cell, collections::HashMap, path::PathBuf, sync::Mutex};

use crate::data::{
    dataset::{WindowDataset, WindowSample},
    partition::BatchedPartition,
};
use crate::domain::{
    batch::{Batch, BatchOutput},
    error::{CheckpointError, TrainError},
    traits::{CheckpointInfo, CheckpointStore, Mode, Model, ModelState, Optimizer},
};

/// A partition of `batches` full batches of `batch_size` samples.
pub fn scripted_partition(batches: usize, batch_size: usize) -> BatchedPartition {
    let samples = (0..batches * batch_size)
        .map(|i| WindowSample { inputs: vec![i as f32, i as f32 + 1.0], target: i as f32 })
        .collect();
    BatchedPartition::new(WindowDataset::new(samples, 2, 1), batch_size)
}

// ─── FakeModel ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FakeModel {
    params:       Vec<f32>,
    mode:         Mode,
    mode_log:     Vec<Mode>,
    train_losses: Vec<f64>,
    train_steps:  usize,
    eval_losses:  Vec<f64>,
    infer_calls:  Cell<usize>,
    fail_after:   Option<usize>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            params:       vec![0.5, -0.25, 1.0],
            mode:         Mode::Train,
            mode_log:     Vec::new(),
            train_losses: Vec::new(),
            train_steps:  0,
            eval_losses:  Vec::new(),
            infer_calls:  Cell::new(0),
            fail_after:   None,
        }
    }

    /// Loss returned by the n-th infer call; the last value repeats.
    pub fn with_eval_losses(mut self, losses: Vec<f64>) -> Self {
        self.eval_losses = losses;
        self
    }

    /// Loss returned by the n-th train step; the last value repeats.
    pub fn with_train_losses(mut self, losses: Vec<f64>) -> Self {
        self.train_losses = losses;
        self
    }

    /// Every infer call after the first `calls` fails.
    pub fn failing_infer_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    pub fn with_params(mut self, params: Vec<f32>) -> Self {
        self.params = params;
        self
    }

    pub fn mode_log(&self) -> &[Mode] {
        &self.mode_log
    }

    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    pub fn infer_calls(&self) -> usize {
        self.infer_calls.get()
    }

    fn scripted(script: &[f64], call: usize) -> f64 {
        script.get(call).or(script.last()).copied().unwrap_or(1.0)
    }
}

impl Model for FakeModel {
    type Gradients = Vec<f32>;

    fn train_step(&mut self, batch: &Batch) -> Result<(BatchOutput, Vec<f32>), TrainError> {
        let loss = Self::scripted(&self.train_losses, self.train_steps);
        self.train_steps += 1;
        let output = BatchOutput {
            loss,
            metric:      loss.sqrt(),
            predictions: batch.targets.iter().map(|t| t - 0.5).collect(),
            targets:     batch.targets.clone(),
        };
        Ok((output, vec![1.0; self.params.len()]))
    }

    fn infer(&self, batch: &Batch) -> Result<BatchOutput, TrainError> {
        let call = self.infer_calls.get();
        self.infer_calls.set(call + 1);

        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(TrainError::Backend("scripted inference failure".into()));
        }

        let loss = Self::scripted(&self.eval_losses, call);
        Ok(BatchOutput {
            loss,
            metric:      loss.sqrt(),
            predictions: batch.targets.iter().map(|t| t + 0.5).collect(),
            targets:     batch.targets.clone(),
        })
    }

    fn parameters(&self) -> Vec<Vec<f32>> {
        vec![self.params.clone()]
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode_log.push(mode);
        self.mode = mode;
    }

    fn state(&self) -> Result<ModelState, TrainError> {
        Ok(ModelState {
            shapes:  vec![vec![self.params.len()]],
            payload: self.params.iter().flat_map(|p| p.to_le_bytes()).collect(),
        })
    }

    fn load_state(&mut self, key: &str, state: &ModelState) -> Result<(), CheckpointError> {
        if state.shapes != vec![vec![self.params.len()]] {
            return Err(CheckpointError::Corrupt {
                key:    key.to_string(),
                reason: format!("expected shapes [[{}]], found {:?}", self.params.len(), state.shapes),
            });
        }
        self.params = state
            .payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(())
    }
}

// ─── FakeOptimizer ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeOptimizer {
    pub learning_rate: f32,
    pub updates:       usize,
    pub zeroed:        usize,
}

impl FakeOptimizer {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate, ..Self::default() }
    }
}

impl Optimizer<FakeModel> for FakeOptimizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn zero_accumulated_gradients(&mut self) {
        self.zeroed += 1;
    }

    fn apply_update(&mut self, model: &mut FakeModel, gradients: Vec<f32>) -> Result<(), TrainError> {
        for (p, g) in model.params.iter_mut().zip(gradients) {
            *p -= self.learning_rate * g;
        }
        self.updates += 1;
        Ok(())
    }
}

// ─── MemoryCheckpointStore ────────────────────────────────────────────────────

/// Keeps checkpoints in memory; nothing survives the process.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<String, (u64, ModelState)>>,
    saves:   Mutex<usize>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total successful saves across all keys
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn version(&self, key: &str) -> Option<u64> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).map(|(version, _)| *version)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, key: &str, state: &ModelState) -> Result<CheckpointInfo, CheckpointError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let version     = entries.get(key).map_or(1, |(v, _)| v + 1);
        entries.insert(key.to_string(), (version, state.clone()));
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        Ok(CheckpointInfo {
            key:  key.to_string(),
            version,
            path: PathBuf::from(format!("memory://{key}-v{version}")),
        })
    }

    fn load(&self, key: &str) -> Result<ModelState, CheckpointError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .map(|(_, state)| state.clone())
            .ok_or_else(|| CheckpointError::NotFound { key: key.to_string() })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_versions() {
        let store = MemoryCheckpointStore::new();
        assert!(matches!(store.load("m"), Err(CheckpointError::NotFound { .. })));

        let state = |b: u8| ModelState { shapes: vec![vec![1]], payload: vec![b] };
        store.save("m", &state(1)).unwrap();
        let info = store.save("m", &state(2)).unwrap();
        assert_eq!(info.version, 2);
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.version("m"), Some(2));
        assert_eq!(store.load("m").unwrap().payload, vec![2]);
    }
}
