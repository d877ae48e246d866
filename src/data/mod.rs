// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw kline CSV all
// the way to batches the training engine can consume.
//
// The pipeline flows in this order:
//
//   market-data.csv
//       │
//       ▼
//   CandleLoader      → parses bars, sorts them oldest-first
//       │
//       ▼
//   split_chronological → train / validation / test blocks
//       │
//       ▼
//   Normalizer        → z-score, fitted on the train block only
//       │
//       ▼
//   Windower          → (window × features) → next target
//       │
//       ▼
//   WindowDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   BatchedPartition  → restartable, ordered batches
//
// Each module is responsible for exactly one step.

/// Reads kline CSV files into Candle values
pub mod loader;

/// Z-score scaling and its inverse
pub mod normalizer;

/// Chronological train/validation/test splitting
pub mod splitter;

/// Sliding-window sample construction
pub mod windowing;

/// Implements Burn's Dataset trait for window samples
pub mod dataset;

/// Stacks samples into batches
pub mod batcher;

/// Partition and DataSource implementations
pub mod partition;
