use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One supervised example: a window of normalised feature rows
/// (flattened row-major, `window × features`) and the normalised
/// target value of the bar that follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSample {
    pub inputs: Vec<f32>,
    pub target: f32,
}

#[derive(Debug)]
pub struct WindowDataset {
    samples:  Vec<WindowSample>,
    window:   usize,
    features: usize,
}

impl WindowDataset {
    pub fn new(samples: Vec<WindowSample>, window: usize, features: usize) -> Self {
        Self { samples, window, features }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn window(&self) -> usize { self.window }

    pub fn features(&self) -> usize { self.features }
}

impl Dataset<WindowSample> for WindowDataset {
    fn get(&self, index: usize) -> Option<WindowSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
