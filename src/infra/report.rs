// ============================================================
// Layer 6 — Console and Fan-out Sinks
// ============================================================
// ConsoleSink prints one line per reporting period and a final
// summary, the same information the CSV gets but for a human
// watching the run.
//
// FanOutSink forwards every callback to several sinks in order,
// so the trainer only ever talks to one ReportSink.
//
//   Trainer ──▶ FanOutSink ──┬──▶ ConsoleSink
//                            └──▶ CsvReportSink

use crate::domain::{
    report::{BatchProgress, PeriodReport, Split, TrainingSummary},
    traits::ReportSink,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    pub fn format_period(report: &PeriodReport) -> String {
        let mut line = format!(
            "Epoch {:>3}/{} | Batch {:>4}/{} | train_loss={:.4} | val_loss={:.4} | val_rmse={:.4}",
            report.epoch,
            report.epochs,
            report.batch,
            report.batches,
            report.train_loss,
            report.validation.loss,
            report.validation.metric,
        );
        if let Some(test) = report.test {
            line.push_str(&format!(" | test_loss={:.4} | test_rmse={:.4}", test.loss, test.metric));
        }
        if let Some(band) = report.test_interval {
            line.push_str(&format!(" | test_95%=[{:.4}, {:.4}]", band.lower, band.upper));
        }
        if report.improved {
            line.push_str(" | best ✓");
        }
        line
    }
}

impl ReportSink for ConsoleSink {
    fn on_batch(&mut self, progress: &BatchProgress) {
        tracing::trace!(
            "epoch {} batch {}/{} loss={:.6}",
            progress.epoch,
            progress.batch,
            progress.batches,
            progress.loss,
        );
    }

    fn on_period(&mut self, report: &PeriodReport) {
        println!("{}", Self::format_period(report));
        if report.stopped {
            println!("Early stopping: no improvement on validation loss, best={:.4}", report.best_score);
        }
    }

    fn on_series(&mut self, split: Split, predictions: &[f32], _ground_truth: &[f32]) {
        tracing::debug!("{} series: {} predictions", split, predictions.len());
    }

    fn on_finish(&mut self, summary: &TrainingSummary) {
        println!();
        println!("Training finished ({})", summary.reason);
        println!("  Epochs completed : {}", summary.epochs_completed);
        println!("  Batches seen     : {}", summary.batches_seen);
        println!("  Evaluations      : {}", summary.evaluations);
        match summary.best_score {
            Some(best) => println!("  Best val loss    : {best:.6}"),
            None       => println!("  Best val loss    : n/a"),
        }
        if let Some(ckpt) = &summary.last_checkpoint {
            println!("  Last checkpoint  : {} v{} ({})", ckpt.key, ckpt.version, ckpt.path.display());
        }
    }
}

/// Forwards every event to each inner sink, in insertion order.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ReportSink for FanOutSink {
    fn on_batch(&mut self, progress: &BatchProgress) {
        self.sinks.iter_mut().for_each(|s| s.on_batch(progress));
    }

    fn on_period(&mut self, report: &PeriodReport) {
        self.sinks.iter_mut().for_each(|s| s.on_period(report));
    }

    fn on_series(&mut self, split: Split, predictions: &[f32], ground_truth: &[f32]) {
        self.sinks.iter_mut().for_each(|s| s.on_series(split, predictions, ground_truth));
    }

    fn on_finish(&mut self, summary: &TrainingSummary) {
        self.sinks.iter_mut().for_each(|s| s.on_finish(summary));
    }
}
