// ============================================================
// Layer 4 — Window Batcher
// ============================================================
// Stacks individual WindowSamples into one Batch.
//
// How batching works here:
//   Input:  Vec of N samples, each `window × features` values
//   Output: Batch with inputs [N, window, features], targets [N, 1]
//
// Every sample already has the same length (fixed window), so
// stacking is a plain concatenation of the flat buffers.
//
// The batch stays framework-free; the model turns it into
// tensors on whatever device it runs on.

use crate::data::dataset::WindowSample;
use crate::domain::batch::Batch;

#[derive(Clone, Debug)]
pub struct WindowBatcher {
    window:   usize,
    features: usize,
}

impl WindowBatcher {
    pub fn new(window: usize, features: usize) -> Self {
        Self { window, features }
    }

    pub fn batch(&self, items: Vec<WindowSample>) -> Batch {
        let mut inputs  = Vec::with_capacity(items.len() * self.window * self.features);
        let mut targets = Vec::with_capacity(items.len());

        for sample in items {
            inputs.extend_from_slice(&sample.inputs);
            targets.push(sample.target);
        }

        Batch::new(inputs, targets, self.window, self.features)
    }
}
