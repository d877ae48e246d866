// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the forecaster.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// The training engine (Layer 5) is written against the traits
// in traits.rs, so every collaborator it talks to (model,
// optimiser, data source, checkpoint store, reporting sink)
// can be swapped for a fake in unit tests.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// A single OHLC price bar and the features derived from it
pub mod candle;

/// One unit of (input, target) data and the model's output for it
pub mod batch;

/// Error taxonomy shared by every layer below the CLI
pub mod error;

/// Windowed scalar accumulator (period averages)
pub mod running_metrics;

/// Progress and outcome records handed to reporting sinks
pub mod report;

/// Core abstractions (traits) that other layers implement
pub mod traits;
