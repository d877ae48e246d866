// ============================================================
// Layer 4 — Sliding Windows
// ============================================================
// Turns a chronological matrix of normalised rows into
// supervised samples:
//
//   rows:     r0 r1 r2 r3 r4 r5        (window_size = 3)
//   sample 0: [r0 r1 r2] → target(r3)
//   sample 1: [r1 r2 r3] → target(r4)
//   sample 2: [r2 r3 r4] → target(r5)
//
// Every row is laid out as [feature_0, ..., feature_k, target];
// the last column is the prediction target and is NOT part of
// the model input (it may duplicate one of the features, e.g.
// close-predicts-close).
//
// A split with `window_size` rows or fewer yields no samples.
// Splits are windowed independently so no window spans a
// train/validation/test boundary.

use crate::data::dataset::WindowSample;

pub struct Windower {
    window_size: usize,
}

impl Windower {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn windows(&self, rows: &[Vec<f32>]) -> Vec<WindowSample> {
        let w = self.window_size;
        if w == 0 || rows.len() <= w {
            return Vec::new();
        }

        (0..rows.len() - w)
            .map(|start| {
                let inputs = rows[start..start + w]
                    .iter()
                    .flat_map(|row| row[..row.len() - 1].iter().copied())
                    .collect();
                let next   = &rows[start + w];
                WindowSample { inputs, target: next[next.len() - 1] }
            })
            .collect()
    }
}
