// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that touch the file system or the
// terminal and don't belong in any specific business layer:
//
//   checkpoint.rs — Saving and loading model snapshots
//                   Versioned, digest-checked payloads under
//                   one directory per logical model name, plus
//                   JSON helpers for train_config.json and
//                   normalizer.json so `evaluate` can rebuild
//                   the exact model and scaling.
//
//   metrics.rs    — Loss-curve and prediction CSV files
//                   metrics.csv gets one row per reporting
//                   period; predictions_<split>.csv holds the
//                   latest series in original price scale.
//
//   report.rs     — Console output and sink fan-out
//
// The training engine only sees the CheckpointStore and
// ReportSink traits, so every type here can be swapped out
// (e.g. an in-memory store in tests).
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// CSV loss curves and prediction series
pub mod metrics;

/// Console and fan-out report sinks
pub mod report;
