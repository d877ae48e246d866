// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a trained checkpoint on one split of the data:
//
//   1. Read train_config.json and normalizer.json so the
//      model and the scaling are rebuilt exactly as trained
//   2. Reload and re-split the candles (same fractions, same
//      window, saved normaliser: no refitting)
//   3. Load the checkpoint into a fresh LSTM
//   4. Run the Evaluator over the chosen split
//   5. Map predictions back to price scale, compute the 95%
//      prediction band, write evaluation_<split>.csv

use anyhow::{anyhow, Result};
use burn::backend::ndarray::NdArrayDevice;
use std::path::PathBuf;

use crate::application::train_use_case::{
    prepare_data, TrainBackend, TrainConfig, CONFIG_FILE, NORMALIZER_FILE,
};
use crate::data::{loader::CandleLoader, normalizer::Normalizer, partition::BatchedPartition};
use crate::domain::{
    report::{ConfidenceInterval, Split},
    traits::{DataSource, InverseTransform, Model},
};
use crate::infra::{checkpoint::FileCheckpointStore, metrics::write_series};
use crate::ml::{
    evaluator::{confidence_interval, Evaluator},
    model::BurnForecaster,
};

#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub checkpoint_dir: String,
    pub split:          Split,
    /// Overrides the data path recorded at training time
    pub data_path:      Option<String>,
    /// Overrides the checkpoint key (e.g. "lstm-epoch")
    pub checkpoint:     Option<String>,
}

/// Outcome of one evaluation, in original price scale where it matters.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub split:            Split,
    pub checkpoint:       String,
    pub version:          u64,
    pub loss:             f64,
    pub rmse:             f64,
    pub samples:          usize,
    pub interval:         ConfidenceInterval,
    pub predictions_path: PathBuf,
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let cfg   = &self.config;
        let store = FileCheckpointStore::new(&cfg.checkpoint_dir);

        // ── Step 1: Rebuild the training setup ────────────────────────────────
        let mut train_cfg: TrainConfig = store.load_json(CONFIG_FILE)?;
        let normalizer:    Normalizer  = store.load_json(NORMALIZER_FILE)?;
        // Series must come out in chronological order
        train_cfg.shuffle = false;
        if let Some(path) = &cfg.data_path {
            train_cfg.data_path = path.clone();
        }

        // ── Step 2: Data ──────────────────────────────────────────────────────
        let candles  = CandleLoader::new(&train_cfg.data_path).load()?;
        let prepared = prepare_data(&train_cfg, &candles, Some(normalizer))?;
        let partition: &BatchedPartition = match cfg.split {
            Split::Train      => prepared.data.train(),
            Split::Validation => prepared.data.validation(),
            Split::Test       => prepared
                .data
                .test()
                .ok_or_else(|| anyhow!("no test split: train_split + val_split leave no candles"))?,
        };

        // ── Step 3: Model ─────────────────────────────────────────────────────
        let key     = cfg.checkpoint.clone().unwrap_or_else(|| train_cfg.model_name.clone());
        let (manifest, state) = store.load_versioned(&key)?;
        let version = manifest.version;
        let mut model = BurnForecaster::<TrainBackend>::new(&train_cfg.model_config(), NdArrayDevice::default());
        model.load_state(&key, &state)?;

        // ── Step 4: Evaluate ──────────────────────────────────────────────────
        let evaluation = Evaluator::new().evaluate(&mut model, partition)?;

        // ── Step 5: Original scale, band, CSV ─────────────────────────────────
        let predictions  = prepared.target.inverse_transform(&evaluation.predictions);
        let ground_truth = prepared.target.inverse_transform(&evaluation.ground_truth);
        let interval     = confidence_interval(&predictions)?;

        let predictions_path = store.dir().join(format!("evaluation_{}.csv", cfg.split));
        write_series(&predictions_path, &predictions, &ground_truth)?;

        tracing::info!(
            "Evaluated '{}' v{} on {} split: loss={:.6}, rmse={:.6}, 95% band=[{:.4}, {:.4}]",
            key, version, cfg.split, evaluation.loss, evaluation.metric, interval.lower, interval.upper,
        );

        Ok(EvaluationReport {
            split:      cfg.split,
            checkpoint: key,
            version,
            loss:       evaluation.loss,
            rmse:       evaluation.metric,
            samples:    predictions.len(),
            interval,
            predictions_path,
        })
    }
}
