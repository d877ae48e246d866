// ============================================================
// Layer 5 — ML / Training Engine
// ============================================================
// Everything that trains and evaluates a model lives here.
// Only model.rs and optimizer.rs import Burn; the engine
// itself (trainer, evaluator, early stopping) is written
// against the Model / Optimizer traits from the domain layer
// and is tested with a fake model, no backend required.
//
// What's in this layer:
//
//   model.rs          — stacked LSTM + dropout + linear head,
//                       and BurnForecaster, the Model adapter
//
//   optimizer.rs      — sgd (momentum) and adam strategies
//
//   early_stopping.rs — MONITORING / STOPPED state machine
//                       with checkpoint-on-improvement
//
//   evaluator.rs      — no-grad pass over a partition, mode
//                       guard, prediction confidence interval
//
//   trainer.rs        — the epoch / batch loop that ties the
//                       pieces together
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) Long Short-Term Memory

/// LSTM forecaster architecture and its Model adapter
pub mod model;

/// Optimiser strategies selectable by name
pub mod optimizer;

/// Patience-based early stopping
pub mod early_stopping;

/// Inference-mode evaluation over a partition
pub mod evaluator;

/// Training orchestrator
pub mod trainer;

#[cfg(test)]
pub(crate) mod testing;
