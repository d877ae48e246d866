// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate config, seed the backend
//   Step 2: Load the kline CSV              (Layer 4 - data)
//   Step 3: Split chronologically           (Layer 4 - data)
//   Step 4: Fit normaliser on train only    (Layer 4 - data)
//   Step 5: Window + batch each split       (Layer 4 - data)
//   Step 6: Save config + normaliser        (Layer 6 - infra)
//   Step 7: Build model, optimiser, sinks   (Layer 5 / 6)
//   Step 8: Run the trainer                 (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::{backend::ndarray::NdArrayDevice, tensor::backend::Backend};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::CandleLoader,
    normalizer::{ColumnScaler, Normalizer},
    partition::{BatchedPartition, SplitData},
    splitter::split_chronological,
    dataset::WindowDataset,
    windowing::Windower,
};
use crate::domain::{
    candle::{Candle, Feature},
    error::TrainError,
    report::TrainingSummary,
    traits::Optimizer,
};
use crate::infra::{
    checkpoint::FileCheckpointStore,
    metrics::CsvReportSink,
    report::{ConsoleSink, FanOutSink},
};
use crate::ml::{
    early_stopping::Direction,
    model::{BurnForecaster, LstmForecasterConfig},
    optimizer::{adam, sgd, OptimizerKind},
    trainer::{Trainer, TrainerConfig},
};

/// CPU backend with autodiff; `valid()` drops to plain NdArray.
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

pub const CONFIG_FILE:     &str = "train_config.json";
pub const NORMALIZER_FILE: &str = "normalizer.json";

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints and
// reloaded by `evaluate` to rebuild the same model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path:                 String,
    pub checkpoint_dir:            String,
    /// Logical model name; the checkpoint key
    pub model_name:                String,
    pub features:                  Vec<Feature>,
    pub target:                    Feature,
    pub window_size:               usize,
    pub train_split:               f64,
    pub val_split:                 f64,
    pub batch_size:                usize,
    pub epochs:                    usize,
    pub lr:                        f64,
    pub optimizer:                 OptimizerKind,
    pub hidden_size:               usize,
    pub num_layers:                usize,
    pub dropout:                   f64,
    pub patience:                  usize,
    pub min_delta:                 f64,
    pub print_every:               usize,
    pub seed:                      u64,
    pub resume:                    bool,
    pub separate_epoch_checkpoint: bool,
    pub shuffle:                   bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:                 "data/klines.csv".to_string(),
            checkpoint_dir:            "checkpoints".to_string(),
            model_name:                "lstm".to_string(),
            features:                  vec![Feature::Close],
            target:                    Feature::Close,
            window_size:               20,
            train_split:               0.7,
            val_split:                 0.15,
            batch_size:                64,
            epochs:                    20,
            lr:                        1e-3,
            optimizer:                 OptimizerKind::Adam,
            hidden_size:               32,
            num_layers:                2,
            dropout:                   0.2,
            patience:                  7,
            min_delta:                 0.0,
            print_every:               50,
            seed:                      42,
            resume:                    false,
            separate_epoch_checkpoint: false,
            shuffle:                   false,
        }
    }
}

impl TrainConfig {
    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), TrainError> {
        let fail = |msg: String| Err(TrainError::Configuration(msg));

        if self.features.is_empty() {
            return fail("at least one input feature is required".into());
        }
        if self.window_size == 0 {
            return fail("window_size must be at least 1".into());
        }
        if self.batch_size == 0 {
            return fail("batch_size must be at least 1".into());
        }
        if self.epochs == 0 {
            return fail("epochs must be at least 1".into());
        }
        if self.print_every == 0 {
            return fail("print_every must be at least 1".into());
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return fail(format!("learning rate must be positive, got {}", self.lr));
        }
        if !(self.train_split > 0.0 && self.train_split < 1.0) {
            return fail(format!("train_split must be in (0, 1), got {}", self.train_split));
        }
        if !(self.val_split > 0.0 && self.train_split + self.val_split <= 1.0 + 1e-9) {
            return fail(format!(
                "val_split must be positive and train_split + val_split <= 1, got {} + {}",
                self.train_split, self.val_split
            ));
        }
        if self.hidden_size == 0 || self.num_layers == 0 {
            return fail("hidden_size and num_layers must be at least 1".into());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return fail(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        // min_delta, checkpoint keys
        self.trainer_config().validate()
    }

    pub fn model_config(&self) -> LstmForecasterConfig {
        LstmForecasterConfig::new(self.features.len(), self.hidden_size)
            .with_num_layers(self.num_layers)
            .with_dropout(self.dropout)
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            epochs:               self.epochs,
            print_every:          self.print_every,
            patience:             self.patience,
            min_delta:            self.min_delta,
            direction:            Direction::Minimize,
            checkpoint_key:       self.model_name.clone(),
            epoch_checkpoint_key: self
                .separate_epoch_checkpoint
                .then(|| format!("{}-epoch", self.model_name)),
        }
    }

    /// Row layout fed to the normaliser: [features..., target]
    fn row(&self, candle: &Candle) -> Vec<f32> {
        self.features
            .iter()
            .chain(std::iter::once(&self.target))
            .map(|&f| candle.feature(f) as f32)
            .collect()
    }
}

// ─── Data preparation ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PreparedData {
    pub data:       SplitData<BatchedPartition>,
    pub normalizer: Normalizer,
    /// Undoes the scaling of the target column
    pub target:     ColumnScaler,
}

/// Split, scale, window and batch `candles`. A previously fitted
/// `normalizer` is reused as-is (resume / evaluate); otherwise one
/// is fitted on the training block.
pub fn prepare_data(
    cfg:        &TrainConfig,
    candles:    &[Candle],
    normalizer: Option<Normalizer>,
) -> Result<PreparedData, TrainError> {
    let rows: Vec<Vec<f32>> = candles.iter().map(|c| cfg.row(c)).collect();
    let (train, validation, test) = split_chronological(rows, cfg.train_split, cfg.val_split);

    let width      = cfg.features.len() + 1;
    let normalizer = match normalizer {
        Some(n) if n.width() != width => {
            return Err(TrainError::config(format!(
                "saved normaliser has {} columns, configuration needs {}",
                n.width(),
                width
            )));
        }
        Some(n) => n,
        None    => Normalizer::fit(&train),
    };
    let target = normalizer
        .column(width - 1)
        .ok_or_else(|| TrainError::Data("normaliser has no target column".into()))?;

    let windower = Windower::new(cfg.window_size);
    let features = cfg.features.len();
    let build    = |rows: &[Vec<f32>]| {
        let samples = windower.windows(&normalizer.transform(rows));
        WindowDataset::new(samples, cfg.window_size, features)
    };

    let train = build(&train);
    if train.sample_count() == 0 {
        return Err(TrainError::Data(format!(
            "training split is too short for window_size {} ({} candles in total)",
            cfg.window_size,
            candles.len()
        )));
    }
    let validation = build(&validation);
    if validation.sample_count() == 0 {
        return Err(TrainError::Data(format!(
            "validation split is too short for window_size {}",
            cfg.window_size
        )));
    }
    let test = Some(build(&test)).filter(|d| d.sample_count() > 0);

    tracing::info!(
        "Windows: {} train, {} validation, {} test",
        train.sample_count(),
        validation.sample_count(),
        test.as_ref().map_or(0, WindowDataset::sample_count),
    );

    let mut train = BatchedPartition::new(train, cfg.batch_size);
    if cfg.shuffle {
        train = train.shuffled(cfg.seed);
    }

    Ok(PreparedData {
        data: SplitData {
            train,
            validation: BatchedPartition::new(validation, cfg.batch_size),
            test:       test.map(|d| BatchedPartition::new(d, cfg.batch_size)),
        },
        normalizer,
        target,
    })
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate and seed ─────────────────────────────────────────
        cfg.validate()?;
        <TrainBackend as Backend>::seed(cfg.seed);

        // ── Step 2: Load candles ──────────────────────────────────────────────
        let candles = CandleLoader::new(&cfg.data_path).load()?;

        // ── Steps 3-5: Split, scale, window ───────────────────────────────────
        // A resumed run keeps the normaliser the checkpoint was trained with.
        let store = FileCheckpointStore::new(&cfg.checkpoint_dir);
        let prior = if cfg.resume {
            Some(store.load_json::<Normalizer>(NORMALIZER_FILE)?)
        } else {
            None
        };
        let prepared = prepare_data(cfg, &candles, prior)?;

        // ── Step 6: Save config for evaluation ────────────────────────────────
        store.save_json(CONFIG_FILE, cfg)?;
        store.save_json(NORMALIZER_FILE, &prepared.normalizer)?;

        // ── Step 7: Model and sinks ───────────────────────────────────────────
        let model = BurnForecaster::<TrainBackend>::new(&cfg.model_config(), NdArrayDevice::default());
        let sink  = FanOutSink::new()
            .with(Box::new(ConsoleSink::new()))
            .with(Box::new(CsvReportSink::new(&cfg.checkpoint_dir)?));

        // ── Step 8: Train ─────────────────────────────────────────────────────
        match cfg.optimizer {
            OptimizerKind::Sgd  => fit_with(cfg, model, sgd::<TrainBackend>(cfg.lr), store, sink, prepared),
            OptimizerKind::Adam => fit_with(cfg, model, adam::<TrainBackend>(cfg.lr), store, sink, prepared),
        }
    }
}

fn fit_with<O>(
    cfg:       &TrainConfig,
    model:     BurnForecaster<TrainBackend>,
    optimizer: O,
    store:     FileCheckpointStore,
    sink:      FanOutSink,
    prepared:  PreparedData,
) -> Result<TrainingSummary>
where
    O: Optimizer<BurnForecaster<TrainBackend>>,
{
    let mut trainer = Trainer::new(model, optimizer, store, Box::new(sink), cfg.trainer_config())
        .with_inverse_transform(Box::new(prepared.target));

    if cfg.resume {
        trainer
            .restore(&cfg.model_name)
            .with_context(|| format!("Cannot resume from checkpoint '{}'", cfg.model_name))?;
    }

    Ok(trainer.fit(&prepared.data)?)
}
