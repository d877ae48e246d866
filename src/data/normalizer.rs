// ============================================================
// Layer 4 — Feature Normalizer
// ============================================================
// Per-column z-score scaling:
//
//   normalised = (x - mu) / sd
//   original   = normalised * sd + mu
//
// mu and sd are population statistics (ddof = 0), fitted on
// the TRAINING split only so validation/test statistics never
// leak into the model's inputs.
//
// A constant column has sd = 0; it is scaled with sd = 1 so
// transform() stays finite and the column's ColumnScaler still
// round-trips.
//
// The fitted normalizer is saved next to the checkpoints so
// `evaluate` reuses exactly the same statistics.

use serde::{Deserialize, Serialize};

use crate::domain::traits::InverseTransform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    mu: Vec<f64>,
    sd: Vec<f64>,
}

impl Normalizer {
    /// Fit column statistics over `rows` (every row has the same width).
    pub fn fit(rows: &[Vec<f32>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let n     = rows.len().max(1) as f64;

        let mut mu = vec![0.0f64; width];
        for row in rows {
            for (m, &x) in mu.iter_mut().zip(row) {
                *m += x as f64;
            }
        }
        mu.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0f64; width];
        for row in rows {
            for ((v, &x), m) in var.iter_mut().zip(row).zip(&mu) {
                *v += (x as f64 - m).powi(2);
            }
        }
        let sd = var
            .into_iter()
            .map(|v| {
                let sd = (v / n).sqrt();
                if sd > f64::EPSILON { sd } else { 1.0 }
            })
            .collect();

        Self { mu, sd }
    }

    pub fn transform(&self, rows: &[Vec<f32>]) -> Vec<Vec<f32>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(c, &x)| ((x as f64 - self.mu[c]) / self.sd[c]) as f32)
                    .collect()
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.mu.len()
    }

    /// Scaler for a single column, e.g. the prediction target.
    pub fn column(&self, index: usize) -> Option<ColumnScaler> {
        Some(ColumnScaler {
            mu: *self.mu.get(index)?,
            sd: *self.sd.get(index)?,
        })
    }
}

/// The statistics of one column; undoes the scaling of model outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaler {
    pub mu: f64,
    pub sd: f64,
}

impl InverseTransform for ColumnScaler {
    fn inverse_transform(&self, values: &[f32]) -> Vec<f32> {
        values
            .iter()
            .map(|&x| (x as f64 * self.sd + self.mu) as f32)
            .collect()
    }
}
