// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the LSTM on a kline CSV
//   2. `evaluate` — loads a checkpoint and scores one split
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "kline-forecaster",
    version,
    about = "Train an LSTM forecaster on kline data, then evaluate its checkpoints."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on candles from: {}", args.data_path);

    let use_case = TrainUseCase::new(args.into());
    let summary  = use_case.execute()?;

    if summary.stopped_early() {
        println!("Training stopped early. Best checkpoint saved.");
    } else {
        println!("Training complete. Checkpoint saved.");
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.into()).execute()?;

    println!();
    println!("Checkpoint : {} v{}", report.checkpoint, report.version);
    println!("Split      : {} ({} windows)", report.split, report.samples);
    println!("MSE        : {:.6}", report.loss);
    println!("RMSE       : {:.6}", report.rmse);
    println!("95% band   : [{:.4}, {:.4}]", report.interval.lower, report.interval.upper);
    println!("Series     : {}", report.predictions_path.display());
    Ok(())
}
