// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, Feature, ...)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::EvaluateConfig,
    train_use_case::TrainConfig,
};
use crate::domain::{candle::Feature, report::Split};
use crate::ml::optimizer::OptimizerKind;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the LSTM forecaster on a kline CSV
    Train(TrainArgs),

    /// Score a trained checkpoint on one data split
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Kline CSV with at least open,high,low,close columns
    #[arg(long, default_value = "data/klines.csv")]
    pub data_path: String,

    /// Directory for checkpoints, config, metrics and predictions
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Logical model name, used as the checkpoint key
    #[arg(long, default_value = "lstm")]
    pub model_name: String,

    /// Input features, comma separated (open,high,low,close)
    #[arg(long, value_delimiter = ',', default_value = "close")]
    pub features: Vec<Feature>,

    /// Column the model learns to predict one bar ahead
    #[arg(long, default_value = "close")]
    pub target: Feature,

    /// Number of past bars in each input window
    #[arg(long, default_value_t = 20)]
    pub window_size: usize,

    /// Fraction of bars (oldest first) used for training
    #[arg(long, default_value_t = 0.7)]
    pub train_split: f64,

    /// Fraction of bars used for validation; the rest is test
    #[arg(long, default_value_t = 0.15)]
    pub val_split: f64,

    /// Number of windows processed together in one step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Update rule: sgd or adam
    #[arg(long, default_value = "adam")]
    pub optimizer: OptimizerKind,

    /// LSTM hidden state size
    #[arg(long, default_value_t = 32)]
    pub hidden_size: usize,

    /// Number of stacked LSTM layers
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Dropout between stacked LSTM layers
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Reporting periods without improvement before stopping
    #[arg(long, default_value_t = 7)]
    pub patience: usize,

    /// Minimum validation-loss decrease that counts as improvement
    #[arg(long, default_value_t = 0.0)]
    pub min_delta: f64,

    /// Validate and report every N batches
    #[arg(long, default_value_t = 50)]
    pub print_every: usize,

    /// Seed for weight initialisation and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Continue from the existing checkpoint and normaliser
    #[arg(long)]
    pub resume: bool,

    /// Write end-of-epoch snapshots to `<model_name>-epoch`
    #[arg(long)]
    pub separate_epoch_checkpoint: bool,

    /// Shuffle the training windows once with the seed
    #[arg(long)]
    pub shuffle: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2:
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:                 a.data_path,
            checkpoint_dir:            a.checkpoint_dir,
            model_name:                a.model_name,
            features:                  a.features,
            target:                    a.target,
            window_size:               a.window_size,
            train_split:               a.train_split,
            val_split:                 a.val_split,
            batch_size:                a.batch_size,
            epochs:                    a.epochs,
            lr:                        a.lr,
            optimizer:                 a.optimizer,
            hidden_size:               a.hidden_size,
            num_layers:                a.num_layers,
            dropout:                   a.dropout,
            patience:                  a.patience,
            min_delta:                 a.min_delta,
            print_every:               a.print_every,
            seed:                      a.seed,
            resume:                    a.resume,
            separate_epoch_checkpoint: a.separate_epoch_checkpoint,
            shuffle:                   a.shuffle,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where `train` saved its checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Split to score: train, validation or test
    #[arg(long, default_value = "test")]
    pub split: Split,

    /// Kline CSV to use instead of the one recorded at training time
    #[arg(long)]
    pub data_path: Option<String>,

    /// Checkpoint key to load instead of the model name
    #[arg(long)]
    pub checkpoint: Option<String>,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            checkpoint_dir: a.checkpoint_dir,
            split:          a.split,
            data_path:      a.data_path,
            checkpoint:     a.checkpoint,
        }
    }
}
