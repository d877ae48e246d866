// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the loss curve and prediction series as CSV files.
//
// Files written into the output directory:
//
//   metrics.csv              ← one row per reporting period
//   predictions_<split>.csv  ← latest prediction-vs-truth series
//                              for that split, original price scale
//
// Example metrics.csv:
//   epoch,batch,train_loss,val_loss,val_rmse,test_loss,test_rmse,test_ci_lower,test_ci_upper,best_score,improved
//   1,50,0.412300,0.398100,0.630900,0.401200,0.633400,101.250000,109.500000,0.398100,true
//   1,100,0.301200,0.322400,0.567800,,,,,0.322400,true
//
// How to read the metrics:
//   - train_loss and val_loss should both fall
//   - val_loss rising while train_loss falls → overfitting,
//     early stopping will kick in after `patience` periods
//   - test columns are empty when no test split is configured;
//     test_ci_* is the 95% band of the test predictions in price
//     scale
//
// Write failures never stop training; they are logged.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{
    report::{PeriodReport, Split},
    traits::ReportSink,
};

const HEADER: &str =
    "epoch,batch,train_loss,val_loss,val_rmse,test_loss,test_rmse,test_ci_lower,test_ci_upper,best_score,improved";

/// One row of metrics.csv
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub epoch:      usize,
    pub batch:      usize,
    pub train_loss: f64,
    pub val_loss:   f64,
    pub val_rmse:   f64,
    pub test_loss:  Option<f64>,
    pub test_rmse:  Option<f64>,
    pub test_ci:    Option<(f64, f64)>,
    pub best_score: f64,
    pub improved:   bool,
}

impl From<&PeriodReport> for PeriodMetrics {
    fn from(r: &PeriodReport) -> Self {
        Self {
            epoch:      r.epoch,
            batch:      r.batch,
            train_loss: r.train_loss,
            val_loss:   r.validation.loss,
            val_rmse:   r.validation.metric,
            test_loss:  r.test.map(|t| t.loss),
            test_rmse:  r.test.map(|t| t.metric),
            test_ci:    r.test_interval.map(|ci| (ci.lower, ci.upper)),
            best_score: r.best_score,
            improved:   r.improved,
        }
    }
}

impl PeriodMetrics {
    fn to_csv_row(&self) -> String {
        let opt = |v: Option<f64>| v.map(|v| format!("{v:.6}")).unwrap_or_default();
        format!(
            "{},{},{:.6},{:.6},{:.6},{},{},{},{},{:.6},{}",
            self.epoch,
            self.batch,
            self.train_loss,
            self.val_loss,
            self.val_rmse,
            opt(self.test_loss),
            opt(self.test_rmse),
            opt(self.test_ci.map(|(lower, _)| lower)),
            opt(self.test_ci.map(|(_, upper)| upper)),
            self.best_score,
            self.improved,
        )
    }
}

/// Write a prediction-vs-truth series, replacing any previous file.
pub fn write_series(path: &Path, predictions: &[f32], ground_truth: &[f32]) -> Result<()> {
    let mut out = String::from("index,prediction,ground_truth\n");
    for (i, (p, t)) in predictions.iter().zip(ground_truth).enumerate() {
        out.push_str(&format!("{i},{p:.6},{t:.6}\n"));
    }
    fs::write(path, out).with_context(|| format!("Cannot write series to '{}'", path.display()))
}

pub fn series_file_name(split: Split) -> String {
    format!("predictions_{}.csv", split.as_str())
}

/// Appends period metrics and rewrites prediction series.
pub struct CsvReportSink {
    dir:      PathBuf,
    csv_path: PathBuf,
}

impl CsvReportSink {
    /// Writes the CSV header if metrics.csv does not exist yet, so
    /// resumed runs keep appending to the same curve.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { dir, csv_path })
    }

    pub fn log(&self, m: &PeriodMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;
        writeln!(f, "{}", m.to_csv_row())?;
        Ok(())
    }

    pub fn series_path(&self, split: Split) -> PathBuf {
        self.dir.join(series_file_name(split))
    }
}

impl ReportSink for CsvReportSink {
    fn on_period(&mut self, report: &PeriodReport) {
        if let Err(e) = self.log(&PeriodMetrics::from(report)) {
            tracing::warn!(error = %e, "Could not append to '{}'", self.csv_path.display());
        }
    }

    fn on_series(&mut self, split: Split, predictions: &[f32], ground_truth: &[f32]) {
        let path = self.series_path(split);
        if let Err(e) = write_series(&path, predictions, ground_truth) {
            tracing::warn!(error = %e, "Could not write {} series", split);
        }
    }
}
