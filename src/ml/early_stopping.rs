// ============================================================
// Layer 5 — Early-Stopping Monitor
// ============================================================
// A two-state machine polled by the trainer after every
// reporting period:
//
//   MONITORING ──(counter > patience)──▶ STOPPED   (terminal)
//
// observe(score, checkpoint):
//   improvement     → best = score, counter = 0, run `checkpoint`
//   no improvement  → counter += 1, stop once counter > patience
//
// With Direction::Minimize (validation loss, the default) an
// improvement is `score < best - min_delta`; with Maximize it
// is `score > best + min_delta`. NaN is never an improvement.
//
// The best model is checkpointed on EVERY improvement, not only
// when stopping, so an interrupted run can always recover the
// best model seen so far. A failed improvement checkpoint is
// only a warning: the next improvement writes again.

use serde::{Deserialize, Serialize};

use crate::domain::{error::TrainError, traits::CheckpointInfo};

/// Which way the monitored score improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lower is better (losses)
    #[default]
    Minimize,
    /// Higher is better (accuracy-style metrics)
    Maximize,
}

impl Direction {
    fn initial_best(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }

    fn improves(self, score: f64, best: f64, min_delta: f64) -> bool {
        match self {
            Direction::Minimize => score < best - min_delta,
            Direction::Maximize => score > best + min_delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Monitoring,
    Stopped,
}

/// Outcome of one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoppingDecision {
    /// New best score. `checkpoint` is None if persisting it failed.
    NewBest { checkpoint: Option<CheckpointInfo> },
    /// Not better; `remaining` more such observations are tolerated.
    NoImprovement { count: usize, remaining: usize },
    /// Patience exhausted (or already stopped).
    Stop,
}

impl StoppingDecision {
    pub fn is_stop(&self) -> bool {
        matches!(self, StoppingDecision::Stop)
    }

    pub fn is_improvement(&self) -> bool {
        matches!(self, StoppingDecision::NewBest { .. })
    }
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:   usize,
    min_delta:  f64,
    direction:  Direction,
    best_score: f64,
    counter:    usize,
    state:      MonitorState,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            direction:  Direction::Minimize,
            best_score: Direction::Minimize.initial_best(),
            counter:    0,
            state:      MonitorState::Monitoring,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction  = direction;
        self.best_score = direction.initial_best();
        self
    }

    /// Feed one validation score. `checkpoint` is only invoked on
    /// improvement and should persist the current model.
    pub fn observe<F>(&mut self, score: f64, checkpoint: F) -> StoppingDecision
    where
        F: FnOnce() -> Result<CheckpointInfo, TrainError>,
    {
        if self.state == MonitorState::Stopped {
            return StoppingDecision::Stop;
        }

        if self.direction.improves(score, self.best_score, self.min_delta) {
            tracing::debug!(
                "Validation score improved ({:.6} --> {:.6}), saving checkpoint",
                self.best_score,
                score,
            );
            self.best_score = score;
            self.counter    = 0;

            let checkpoint = match checkpoint() {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Improvement checkpoint failed, will retry on next improvement"
                    );
                    None
                }
            };
            return StoppingDecision::NewBest { checkpoint };
        }

        self.counter += 1;
        tracing::debug!("EarlyStopping counter: {} out of {}", self.counter, self.patience);

        if self.counter > self.patience {
            self.state = MonitorState::Stopped;
            StoppingDecision::Stop
        } else {
            StoppingDecision::NoImprovement {
                count:     self.counter,
                remaining: self.patience + 1 - self.counter,
            }
        }
    }

    pub fn best_score(&self) -> f64 { self.best_score }

    pub fn counter(&self) -> usize { self.counter }

    pub fn is_stopped(&self) -> bool {
        self.state == MonitorState::Stopped
    }

    /// Best score, or None if nothing has been observed yet
    pub fn best_observed(&self) -> Option<f64> {
        self.best_score.is_finite().then_some(self.best_score)
    }
}
