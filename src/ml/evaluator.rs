// ============================================================
// Layer 5 — Evaluation Runner
// ============================================================
// Runs a model over a validation or test partition with no
// gradient tracking and averages the per-batch loss (MSE) and
// metric (RMSE).
//
// The model is switched into Eval mode for the duration of
// the call. A ModeGuard puts the previous mode back when it
// goes out of scope, so training mode is restored on every
// exit path: normal return, `?` on a failing batch, or panic.
//
// Parameters are never touched here: the guard only exposes
// the model through `Deref`, and Model::infer takes `&self`.
//
// confidence_interval() is a diagnostic on a finished series
// of predictions and plays no part in training decisions.

use std::ops::Deref;

use crate::domain::{
    error::{EmptyWindowError, TrainError},
    report::ConfidenceInterval,
    running_metrics::RunningMetrics,
    traits::{Mode, Model, Partition},
};

/// Averages of one full pass plus the raw (normalised) series.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub loss:         f64,
    pub metric:       f64,
    pub predictions:  Vec<f32>,
    pub ground_truth: Vec<f32>,
}

// ─── Mode guard ───────────────────────────────────────────────────────────────

struct ModeGuard<'a, M: Model> {
    model:    &'a mut M,
    previous: Mode,
}

impl<'a, M: Model> ModeGuard<'a, M> {
    fn enter(model: &'a mut M, mode: Mode) -> Self {
        let previous = model.mode();
        model.set_mode(mode);
        Self { model, previous }
    }
}

impl<M: Model> Deref for ModeGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: Model> Drop for ModeGuard<'_, M> {
    fn drop(&mut self) {
        self.model.set_mode(self.previous);
    }
}

// ─── Evaluator ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate<M, P>(&self, model: &mut M, partition: &P) -> Result<Evaluation, TrainError>
    where
        M: Model,
        P: Partition + ?Sized,
    {
        if partition.is_empty() {
            return Err(EmptyWindowError.into());
        }

        let model = ModeGuard::enter(model, Mode::Eval);

        let mut losses       = RunningMetrics::new();
        let mut metrics      = RunningMetrics::new();
        let mut predictions  = Vec::new();
        let mut ground_truth = Vec::new();

        for batch in partition.batches() {
            let output = model.infer(&batch)?;
            losses.record(output.loss);
            metrics.record(output.metric);
            predictions.extend(output.predictions);
            ground_truth.extend(output.targets);
        }

        Ok(Evaluation {
            loss:   losses.average()?,
            metric: metrics.average()?,
            predictions,
            ground_truth,
        })
    }
}

// ─── Confidence interval ──────────────────────────────────────────────────────

/// 2.5th / 97.5th percentile band of `values`, linearly interpolated
/// between the closest ranks.
pub fn confidence_interval(values: &[f32]) -> Result<ConfidenceInterval, EmptyWindowError> {
    if values.is_empty() {
        return Err(EmptyWindowError);
    }

    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(f64::total_cmp);

    Ok(ConfidenceInterval {
        lower: percentile(&sorted, 0.025),
        upper: percentile(&sorted, 0.975),
    })
}

/// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lo       = position.floor() as usize;
    let hi       = position.ceil() as usize;
    let weight   = position - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * weight
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::testing::{scripted_partition, FakeModel};

    #[test]
    fn test_confidence_interval_of_one_to_hundred() {
        let values: Vec<f32> = (1..=100).map(|v| v as f32).collect();
        let ci = confidence_interval(&values).unwrap();
        assert!((ci.lower - 3.475).abs() < 1e-9);
        assert!((ci.upper - 97.525).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_interval_single_value() {
        let ci = confidence_interval(&[5.0]).unwrap();
        assert_eq!(ci, ConfidenceInterval { lower: 5.0, upper: 5.0 });
    }

    #[test]
    fn test_confidence_interval_ignores_input_order() {
        let a = confidence_interval(&[3.0, 1.0, 2.0, 5.0, 4.0]).unwrap();
        let b = confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_confidence_interval_empty_is_error() {
        assert_eq!(confidence_interval(&[]), Err(EmptyWindowError));
    }

    #[test]
    fn test_evaluate_averages_over_batches() {
        let mut model = FakeModel::new().with_eval_losses(vec![1.0, 3.0]);
        let partition = scripted_partition(2, 2);

        let eval = Evaluator::new().evaluate(&mut model, &partition).unwrap();
        assert_eq!(eval.loss, 2.0);
        assert_eq!(eval.predictions.len(),  4);
        assert_eq!(eval.ground_truth.len(), 4);
    }

    #[test]
    fn test_evaluate_restores_training_mode() {
        let mut model = FakeModel::new();
        model.set_mode(Mode::Train);
        Evaluator::new().evaluate(&mut model, &scripted_partition(3, 1)).unwrap();

        assert_eq!(model.mode(), Mode::Train);
        assert!(model.mode_log().contains(&Mode::Eval));
    }

    #[test]
    fn test_evaluate_restores_mode_when_a_batch_fails() {
        let mut model = FakeModel::new().failing_infer_after(1);
        model.set_mode(Mode::Train);

        let result = Evaluator::new().evaluate(&mut model, &scripted_partition(3, 1));
        assert!(matches!(result, Err(TrainError::Backend(_))));
        assert_eq!(model.mode(), Mode::Train);
    }

    #[test]
    fn test_evaluate_never_mutates_parameters() {
        let mut model = FakeModel::new();
        let before    = model.parameters();
        Evaluator::new().evaluate(&mut model, &scripted_partition(4, 2)).unwrap();
        assert_eq!(model.parameters(), before);
    }

    #[test]
    fn test_empty_partition_is_empty_window() {
        let mut model = FakeModel::new();
        let result    = Evaluator::new().evaluate(&mut model, &scripted_partition(0, 1));
        assert!(matches!(result, Err(TrainError::EmptyWindow(_))));
        assert!(model.mode_log().is_empty());
    }
}
