// ============================================================
// Layer 5 — Training Orchestrator
// ============================================================
// Drives epochs and batches:
//
//   for each epoch:
//     for each train batch:
//       zero grads → forward → loss → backprop → optimiser step
//       every `print_every` batches:
//         training series of the period → sink
//         evaluate validation      → EarlyStopping::observe
//                                     (checkpoint on improvement)
//         evaluate test (if any)   → reporting only, with the
//                                     95% band of its predictions
//         report period, reset the training window
//         STOPPED? → leave both loops
//     epoch finished without stopping → end-of-epoch checkpoint
//
// The trainer is generic over Model / Optimizer / CheckpointStore
// and owns all three for the whole run; the sink and the inverse
// transform are trait objects. Nothing here knows about Burn.
//
// Failure policy:
//   bad configuration / empty train or validation  → Err before any batch
//   backend error during a step or an evaluation  → Err, run aborts
//   end-of-epoch checkpoint failure               → Err, run aborts
//   improvement checkpoint failure                → warning only

use crate::domain::{
    batch::BatchOutput,
    error::TrainError,
    report::{BatchProgress, EvalScore, PeriodReport, Split, TerminationReason, TrainingSummary},
    running_metrics::RunningMetrics,
    traits::{
        is_valid_checkpoint_key, CheckpointInfo, CheckpointStore, DataSource, Identity,
        InverseTransform, Mode, Model, Optimizer, Partition, ReportSink,
    },
};
use crate::ml::{
    early_stopping::{Direction, EarlyStopping, StoppingDecision},
    evaluator::{confidence_interval, Evaluator},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub epochs:               usize,
    /// Reporting period, in batches within an epoch
    pub print_every:          usize,
    pub patience:             usize,
    pub min_delta:            f64,
    pub direction:            Direction,
    /// Key the best model is checkpointed under
    pub checkpoint_key:       String,
    /// End-of-epoch snapshots go here; None means `checkpoint_key`
    pub epoch_checkpoint_key: Option<String>,
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 {
            return Err(TrainError::config("epochs must be at least 1"));
        }
        if self.print_every == 0 {
            return Err(TrainError::config("print_every must be at least 1"));
        }
        if !self.min_delta.is_finite() || self.min_delta < 0.0 {
            return Err(TrainError::config(format!(
                "min_delta must be a non-negative number, got {}",
                self.min_delta
            )));
        }
        for key in std::iter::once(&self.checkpoint_key).chain(&self.epoch_checkpoint_key) {
            if !is_valid_checkpoint_key(key) {
                return Err(TrainError::config(format!(
                    "invalid checkpoint key '{key}': use letters, digits, '-', '_' or '.'"
                )));
            }
        }
        Ok(())
    }

    pub fn epoch_key(&self) -> &str {
        self.epoch_checkpoint_key.as_deref().unwrap_or(&self.checkpoint_key)
    }
}

/// Counters threaded through one run.
#[derive(Debug, Default)]
struct RunProgress {
    epochs_completed: usize,
    batches_seen:     usize,
    evaluations:      usize,
    last_checkpoint:  Option<CheckpointInfo>,
}

/// Training losses and prediction series of the current reporting period.
#[derive(Debug, Default)]
struct PeriodWindow {
    losses:       RunningMetrics,
    predictions:  Vec<f32>,
    ground_truth: Vec<f32>,
}

impl PeriodWindow {
    fn record(&mut self, output: BatchOutput) {
        self.losses.record(output.loss);
        self.predictions.extend(output.predictions);
        self.ground_truth.extend(output.targets);
    }

    fn reset(&mut self) {
        self.losses.reset();
        self.predictions.clear();
        self.ground_truth.clear();
    }
}

pub struct Trainer<M, O, S>
where
    M: Model,
    O: Optimizer<M>,
    S: CheckpointStore,
{
    model:     M,
    optimizer: O,
    store:     S,
    sink:      Box<dyn ReportSink>,
    inverse:   Box<dyn InverseTransform>,
    evaluator: Evaluator,
    config:    TrainerConfig,
}

impl<M, O, S> Trainer<M, O, S>
where
    M: Model,
    O: Optimizer<M>,
    S: CheckpointStore,
{
    pub fn new(model: M, optimizer: O, store: S, sink: Box<dyn ReportSink>, config: TrainerConfig) -> Self {
        Self {
            model,
            optimizer,
            store,
            sink,
            inverse:   Box::new(Identity),
            evaluator: Evaluator::new(),
            config,
        }
    }

    /// Used to map prediction series back to price scale before
    /// they reach the sink.
    pub fn with_inverse_transform(mut self, inverse: Box<dyn InverseTransform>) -> Self {
        self.inverse = inverse;
        self
    }

    /// Load `key` from the store into the model. Failure is fatal
    /// for the caller: resuming from a bad checkpoint is never silent.
    pub fn restore(&mut self, key: &str) -> Result<(), TrainError> {
        let state = self.store.load(key)?;
        self.model.load_state(key, &state)?;
        tracing::info!("Resumed model from checkpoint '{}'", key);
        Ok(())
    }

    pub fn fit<D: DataSource>(&mut self, data: &D) -> Result<TrainingSummary, TrainError> {
        match self.run(data) {
            Ok(summary) => {
                tracing::info!(
                    "Training finished: {} after {} epoch(s), {} batches, {} evaluation(s)",
                    summary.reason,
                    summary.epochs_completed,
                    summary.batches_seen,
                    summary.evaluations,
                );
                self.sink.on_finish(&summary);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(error = %e, "Training aborted");
                Err(e)
            }
        }
    }

    fn run<D: DataSource>(&mut self, data: &D) -> Result<TrainingSummary, TrainError> {
        self.config.validate()?;

        let train = data.train();
        if train.is_empty() {
            return Err(TrainError::config("training partition is empty"));
        }
        if data.validation().is_empty() {
            return Err(TrainError::config("validation partition is empty"));
        }
        let test = match data.test() {
            Some(p) if p.is_empty() => {
                tracing::warn!("Test partition is empty, skipping test evaluation");
                None
            }
            other => other,
        };

        let mut monitor = EarlyStopping::new(self.config.patience, self.config.min_delta)
            .with_direction(self.config.direction);
        let mut window   = PeriodWindow::default();
        let mut progress = RunProgress::default();
        let epochs       = self.config.epochs;
        let batches      = train.batch_count();

        tracing::info!(
            "Training for {} epoch(s), {} batches/epoch, optimizer={}, report every {} batches",
            epochs,
            batches,
            self.optimizer.name(),
            self.config.print_every,
        );
        self.model.set_mode(Mode::Train);

        let mut reason = TerminationReason::EpochsExhausted;

        'epochs: for epoch in 1..=epochs {
            window.reset();

            for (idx, batch) in train.batches().enumerate() {
                self.optimizer.zero_accumulated_gradients();
                let (output, gradients) = self.model.train_step(&batch)?;
                self.optimizer.apply_update(&mut self.model, gradients)?;

                let loss = output.loss;
                window.record(output);
                progress.batches_seen += 1;
                self.sink.on_batch(&BatchProgress { epoch, epochs, batch: idx + 1, batches, loss });

                if (idx + 1) % self.config.print_every != 0 {
                    continue;
                }

                let report = self.report_period(
                    epoch,
                    idx + 1,
                    batches,
                    &mut window,
                    &mut monitor,
                    &mut progress,
                    data.validation(),
                    test,
                )?;

                if monitor.is_stopped() {
                    tracing::info!("Early stopping at epoch {}, batch {}", epoch, idx + 1);
                    reason = TerminationReason::EarlyStopped { epoch, batch: idx + 1 };
                    break 'epochs;
                }
            }

            let info = self.checkpoint(self.config.epoch_key())?;
            tracing::info!("Checkpoint saved for epoch {} ({} v{})", epoch, info.key, info.version);
            progress.last_checkpoint  = Some(info);
            progress.epochs_completed = epoch;
        }

        Ok(TrainingSummary {
            reason,
            epochs_completed: progress.epochs_completed,
            batches_seen:     progress.batches_seen,
            evaluations:      progress.evaluations,
            best_score:       monitor.best_observed(),
            last_checkpoint:  progress.last_checkpoint,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn report_period<P: Partition>(
        &mut self,
        epoch:      usize,
        batch:      usize,
        batches:    usize,
        window:     &mut PeriodWindow,
        monitor:    &mut EarlyStopping,
        progress:   &mut RunProgress,
        validation: &P,
        test:       Option<&P>,
    ) -> Result<PeriodReport, TrainError> {
        let train_loss = window.losses.average()?;
        self.emit_series(Split::Train, &window.predictions, &window.ground_truth);
        window.reset();

        let validation = self.evaluator.evaluate(&mut self.model, validation)?;
        self.emit_series(Split::Validation, &validation.predictions, &validation.ground_truth);
        progress.evaluations += 1;

        // Only the validation loss ever reaches the monitor.
        let (model, store, key) = (&self.model, &self.store, self.config.checkpoint_key.as_str());
        let decision = monitor.observe(validation.loss, || {
            let state = model.state()?;
            Ok(store.save(key, &state)?)
        });
        if let StoppingDecision::NewBest { checkpoint: Some(info) } = &decision {
            progress.last_checkpoint = Some(info.clone());
        }

        let (test, test_interval) = match test {
            Some(partition) => {
                let evaluation  = self.evaluator.evaluate(&mut self.model, partition)?;
                let predictions = self.emit_series(Split::Test, &evaluation.predictions, &evaluation.ground_truth);
                let interval    = confidence_interval(&predictions)?;
                (Some(EvalScore { loss: evaluation.loss, metric: evaluation.metric }), Some(interval))
            }
            None => (None, None),
        };

        let report = PeriodReport {
            epoch,
            epochs: self.config.epochs,
            batch,
            batches,
            train_loss,
            validation: EvalScore { loss: validation.loss, metric: validation.metric },
            test,
            test_interval,
            best_score: monitor.best_score(),
            improved:   decision.is_improvement(),
            stopped:    decision.is_stop(),
        };

        tracing::debug!(
            "Epoch {}/{} batch {}/{}: train={:.6} val={:.6} best={:.6} patience counter={}",
            epoch, report.epochs, batch, batches, train_loss, validation.loss, report.best_score,
            monitor.counter(),
        );
        self.sink.on_period(&report);
        Ok(report)
    }

    /// Map a series back to original scale and hand it to the sink.
    /// Returns the original-scale predictions.
    fn emit_series(&mut self, split: Split, predictions: &[f32], ground_truth: &[f32]) -> Vec<f32> {
        let predictions  = self.inverse.inverse_transform(predictions);
        let ground_truth = self.inverse.inverse_transform(ground_truth);
        self.sink.on_series(split, &predictions, &ground_truth);
        predictions
    }

    fn checkpoint(&self, key: &str) -> Result<CheckpointInfo, TrainError> {
        let state = self.model.state()?;
        Ok(self.store.save(key, &state)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    use crate::data::partition::{BatchedPartition, SplitData};
    use crate::domain::{
        error::CheckpointError,
        traits::ModelState,
    };
    use crate::ml::testing::{scripted_partition, FakeModel, FakeOptimizer, MemoryCheckpointStore};

    // ── Recording sink ───────────────────────────────────────────────────────

    #[derive(Default)]
    struct Recorded {
        batches:  usize,
        periods:  Vec<PeriodReport>,
        series:   Vec<(Split, Vec<f32>, Vec<f32>)>,
        finished: Option<TrainingSummary>,
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Recorded>>);

    impl ReportSink for RecordingSink {
        fn on_batch(&mut self, _progress: &BatchProgress) {
            self.0.borrow_mut().batches += 1;
        }

        fn on_period(&mut self, report: &PeriodReport) {
            self.0.borrow_mut().periods.push(report.clone());
        }

        fn on_series(&mut self, split: Split, predictions: &[f32], ground_truth: &[f32]) {
            self.0.borrow_mut().series.push((split, predictions.to_vec(), ground_truth.to_vec()));
        }

        fn on_finish(&mut self, summary: &TrainingSummary) {
            self.0.borrow_mut().finished = Some(summary.clone());
        }
    }

    /// Store whose saves always fail.
    struct BrokenStore;

    impl CheckpointStore for BrokenStore {
        fn save(&self, key: &str, _state: &ModelState) -> Result<CheckpointInfo, CheckpointError> {
            Err(CheckpointError::Io {
                key:    key.to_string(),
                path:   "/read-only".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn load(&self, key: &str) -> Result<ModelState, CheckpointError> {
            Err(CheckpointError::NotFound { key: key.to_string() })
        }
    }

    struct Doubled;

    impl InverseTransform for Doubled {
        fn inverse_transform(&self, values: &[f32]) -> Vec<f32> {
            values.iter().map(|v| v * 2.0).collect()
        }
    }

    fn config(epochs: usize, print_every: usize, patience: usize) -> TrainerConfig {
        TrainerConfig {
            epochs,
            print_every,
            patience,
            min_delta:            0.0,
            direction:            Direction::Minimize,
            checkpoint_key:       "lstm".into(),
            epoch_checkpoint_key: None,
        }
    }

    fn data(train_batches: usize, test: Option<usize>) -> SplitData<BatchedPartition> {
        SplitData {
            train:      scripted_partition(train_batches, 2),
            validation: scripted_partition(1, 2),
            test:       test.map(|n| scripted_partition(n, 2)),
        }
    }

    fn trainer<S: CheckpointStore>(
        model:  FakeModel,
        store:  S,
        config: TrainerConfig,
    ) -> (Trainer<FakeModel, FakeOptimizer, S>, Rc<RefCell<Recorded>>) {
        let sink     = RecordingSink::default();
        let recorded = Rc::clone(&sink.0);
        let trainer  = Trainer::new(model, FakeOptimizer::new(0.1), store, Box::new(sink), config);
        (trainer, recorded)
    }

    #[test]
    fn test_empty_train_partition_is_configuration_error() {
        let (mut t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 1));
        let err = t.fit(&data(0, None)).unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(t.model.train_steps(), 0);
        assert_eq!(recorded.borrow().batches, 0);
        assert!(recorded.borrow().finished.is_none());
    }

    #[test]
    fn test_empty_validation_partition_is_configuration_error() {
        let (mut t, _) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 1));
        let mut d      = data(2, None);
        d.validation   = scripted_partition(0, 2);
        assert!(t.fit(&d).unwrap_err().is_configuration());
    }

    #[test]
    fn test_zero_print_every_is_configuration_error() {
        let (mut t, _) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 0, 1));
        assert!(t.fit(&data(2, None)).unwrap_err().is_configuration());
        assert_eq!(t.model.train_steps(), 0);
    }

    #[test]
    fn test_print_every_larger_than_epoch_still_checkpoints() {
        let (mut t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 100, 1));
        let summary = t.fit(&data(50, None)).unwrap();

        assert_eq!(summary.evaluations, 0);
        assert_eq!(summary.reason, TerminationReason::EpochsExhausted);
        assert_eq!(summary.batches_seen, 50);
        assert_eq!(summary.best_score, None);
        assert_eq!(t.store.save_count(), 1);
        assert_eq!(t.model.infer_calls(), 0);
        assert!(recorded.borrow().periods.is_empty());
    }

    #[test]
    fn test_one_update_per_batch() {
        let (mut t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(3, 2, 10));
        let summary = t.fit(&data(4, None)).unwrap();

        assert_eq!(summary.batches_seen, 12);
        assert_eq!(summary.epochs_completed, 3);
        assert_eq!(t.model.train_steps(), 12);
        assert_eq!(t.optimizer.updates, 12);
        assert_eq!(t.optimizer.zeroed, 12);
        assert_eq!(recorded.borrow().batches, 12);
        // 2 periods per epoch
        assert_eq!(summary.evaluations, 6);
    }

    #[test]
    fn test_period_train_loss_averages_its_window() {
        let model = FakeModel::new().with_train_losses(vec![1.0, 3.0, 10.0, 20.0]);
        let (mut t, recorded) = trainer(model, MemoryCheckpointStore::new(), config(1, 2, 10));
        t.fit(&data(4, None)).unwrap();

        let periods = &recorded.borrow().periods;
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].train_loss, 2.0);
        assert_eq!(periods[1].train_loss, 15.0);
    }

    #[test]
    fn test_early_stop_exits_both_loops() {
        // Validation: improvement, then flat forever. Patience 1 → stop on 3rd period.
        let model = FakeModel::new().with_eval_losses(vec![1.0, 2.0]);
        let (mut t, recorded) = trainer(model, MemoryCheckpointStore::new(), config(5, 1, 1));
        let summary = t.fit(&data(4, None)).unwrap();

        assert_eq!(summary.reason, TerminationReason::EarlyStopped { epoch: 1, batch: 3 });
        assert!(summary.stopped_early());
        assert_eq!(summary.batches_seen, 3);
        assert_eq!(summary.epochs_completed, 0);
        assert_eq!(summary.best_score, Some(1.0));
        // Only the single improvement was checkpointed; no end-of-epoch save after a stop
        assert_eq!(t.store.save_count(), 1);

        let rec = recorded.borrow();
        assert!(rec.periods.last().is_some_and(|p| p.stopped));
        assert_eq!(rec.finished.as_ref(), Some(&summary));
    }

    #[test]
    fn test_test_scores_never_feed_the_monitor() {
        // Calls alternate validation, test. Test losses are tiny but must be ignored.
        let model = FakeModel::new().with_eval_losses(vec![1.0, 0.01, 1.5, 0.001, 1.5, 0.0001]);
        let (mut t, recorded) = trainer(model, MemoryCheckpointStore::new(), config(1, 1, 1));
        let summary = t.fit(&data(3, Some(1))).unwrap();

        assert_eq!(summary.best_score, Some(1.0));
        assert!(summary.stopped_early());

        let rec = recorded.borrow();
        assert_eq!(rec.periods[0].test.map(|s| s.loss), Some(0.01));
        assert!(rec.series.iter().any(|(split, _, _)| *split == Split::Test));
    }

    #[test]
    fn test_empty_test_partition_is_skipped() {
        let (mut t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 5));
        t.fit(&data(2, Some(0))).unwrap();

        let rec = recorded.borrow();
        assert!(rec.periods.iter().all(|p| p.test.is_none() && p.test_interval.is_none()));
        assert!(rec.series.iter().all(|(split, _, _)| *split != Split::Test));
    }

    #[test]
    fn test_series_are_inverse_transformed() {
        let (t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 5));
        let mut t = t.with_inverse_transform(Box::new(Doubled));
        t.fit(&data(1, None)).unwrap();

        let rec = recorded.borrow();
        let (_, predictions, truth) = rec
            .series
            .iter()
            .find(|(split, _, _)| *split == Split::Validation)
            .unwrap();
        // Validation targets are [0, 1]; the fake predicts target + 0.5
        assert_eq!(truth, &vec![0.0, 2.0]);
        assert_eq!(predictions, &vec![1.0, 3.0]);
    }

    #[test]
    fn test_training_series_is_emitted_per_period() {
        let (t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 2, 5));
        let mut t = t.with_inverse_transform(Box::new(Doubled));
        t.fit(&data(4, None)).unwrap();

        let rec = recorded.borrow();
        let train: Vec<_> = rec.series.iter().filter(|(split, _, _)| *split == Split::Train).collect();
        assert_eq!(train.len(), 2);

        // Period 1 saw targets 0..4, period 2 saw 4..8; training
        // predictions are target - 0.5, then doubled.
        assert_eq!(train[0].2, vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(train[0].1, vec![-1.0, 1.0, 3.0, 5.0]);
        assert_eq!(train[1].2, vec![8.0, 10.0, 12.0, 14.0]);
        assert_eq!(train[1].1, vec![7.0, 9.0, 11.0, 13.0]);
    }

    #[test]
    fn test_period_reports_test_interval() {
        let (mut t, recorded) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 5));
        t.fit(&data(2, Some(1))).unwrap();

        let rec = recorded.borrow();
        assert_eq!(rec.periods.len(), 2);
        // Test predictions are [0.5, 1.5]
        for period in &rec.periods {
            let band = period.test_interval.unwrap();
            assert!((band.lower - 0.525).abs() < 1e-9);
            assert!((band.upper - 1.475).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_checkpoint_key_fails_before_training() {
        let mut cfg = config(1, 1, 5);
        cfg.checkpoint_key = "lstm v2".into();
        let (mut t, _) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), cfg);
        assert!(t.fit(&data(4, None)).unwrap_err().is_configuration());
        assert_eq!(t.model.train_steps(), 0);

        let mut cfg = config(1, 1, 5);
        cfg.epoch_checkpoint_key = Some("../lstm".into());
        assert!(cfg.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_negative_min_delta_is_configuration_error() {
        let mut cfg = config(1, 1, 5);
        cfg.min_delta = -0.1;
        assert!(cfg.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_failing_improvement_checkpoint_only_warns() {
        let mut cfg = config(1, 1, 5);
        cfg.epoch_checkpoint_key = Some("lstm-epoch".into());
        let (mut t, _) = trainer(FakeModel::new(), BrokenStore, cfg);

        // The run reaches the end of the epoch and only then fails on
        // the mandatory end-of-epoch checkpoint.
        let err = t.fit(&data(2, None)).unwrap_err();
        assert!(matches!(err, TrainError::Checkpoint(CheckpointError::Io { ref key, .. }) if key == "lstm-epoch"));
        assert_eq!(t.model.train_steps(), 2);
    }

    #[test]
    fn test_backend_error_aborts_run() {
        let model = FakeModel::new().failing_infer_after(1);
        let (mut t, recorded) = trainer(model, MemoryCheckpointStore::new(), config(1, 1, 5));
        let err = t.fit(&data(3, None)).unwrap_err();

        assert!(matches!(err, TrainError::Backend(_)));
        assert_eq!(t.model.train_steps(), 2);
        assert_eq!(t.model.mode(), Mode::Train);
        assert!(recorded.borrow().finished.is_none());
    }

    #[test]
    fn test_separate_epoch_checkpoint_key() {
        let mut cfg = config(2, 100, 5);
        cfg.epoch_checkpoint_key = Some("lstm-epoch".into());
        let (mut t, _) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), cfg);
        let summary = t.fit(&data(2, None)).unwrap();

        assert!(t.store.load("lstm-epoch").is_ok());
        assert!(t.store.load("lstm").is_err());
        assert_eq!(summary.last_checkpoint.map(|c| c.version), Some(2));
    }

    #[test]
    fn test_best_model_is_checkpointed_under_main_key() {
        let mut cfg = config(1, 1, 5);
        cfg.epoch_checkpoint_key = Some("lstm-epoch".into());
        let model = FakeModel::new().with_eval_losses(vec![3.0, 2.0, 2.5]);
        let (mut t, _) = trainer(model, MemoryCheckpointStore::new(), cfg);
        t.fit(&data(3, None)).unwrap();

        // Two improvements → two versions of the best checkpoint
        let best = t.store.load("lstm").unwrap();
        assert_eq!(t.store.version("lstm"), Some(2));
        assert_eq!(best.shapes, vec![vec![3]]);
    }

    #[test]
    fn test_restore_loads_saved_parameters() {
        let store = MemoryCheckpointStore::new();
        let saved = FakeModel::new().with_params(vec![9.0, 8.0, 7.0]);
        store.save("lstm", &saved.state().unwrap()).unwrap();

        let (mut t, _) = trainer(FakeModel::new(), store, config(1, 1, 1));
        t.restore("lstm").unwrap();
        assert_eq!(t.model.parameters(), vec![vec![9.0, 8.0, 7.0]]);
    }

    #[test]
    fn test_restore_missing_checkpoint_fails() {
        let (mut t, _) = trainer(FakeModel::new(), MemoryCheckpointStore::new(), config(1, 1, 1));
        let err = t.restore("nope").unwrap_err();
        assert!(matches!(err, TrainError::Checkpoint(CheckpointError::NotFound { .. })));
    }
}
