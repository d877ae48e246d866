// ============================================================
// Layer 3 — RunningMetrics (Metric Aggregator)
// ============================================================
// Accumulates per-batch scalars for one reporting window and
// reduces them to an arithmetic mean.
//
// The mean is always recomputed from the whole window (no
// exponential decay). The aggregator knows nothing about how
// often it is read: the trainer calls reset() at every
// reporting boundary.
//
// Averaging an empty window is an explicit EmptyWindowError,
// never a silent NaN.

use crate::domain::error::EmptyWindowError;

#[derive(Debug, Clone, Default)]
pub struct RunningMetrics {
    values: Vec<f64>,
}

impl RunningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn average(&self) -> Result<f64, EmptyWindowError> {
        if self.values.is_empty() {
            return Err(EmptyWindowError);
        }
        Ok(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}
